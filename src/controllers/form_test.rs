use super::*;
use crate::dom::Selector;
use crate::fixtures::{self, announcements, run_for, toast_messages};
use crate::memory_dom::MemoryDom;

struct FormPage {
    form: NodeId,
    name: NodeId,
    email: NodeId,
    button: NodeId,
}

fn form_page(dom: &mut MemoryDom) -> FormPage {
    let body = dom.body();
    let form = dom.build(body, "form").attr("data-validate", "").id();
    let name_group = dom.build(form, "div").class("form-group").id();
    let name = dom.build(name_group, "input").attr("type", "text").attr("required", "").id();
    let email_group = dom.build(form, "div").class("form-group").id();
    let email = dom.build(email_group, "input").attr("type", "email").id();
    let button = dom.build(form, "button").attr("type", "submit").text("Send").id();
    FormPage { form, name, email, button }
}

fn setup() -> (Env, FormController, FormPage) {
    let mut dom = MemoryDom::new();
    let page = form_page(&mut dom);
    let env = fixtures::env(dom);
    let forms = FormController::new(&env);
    (env, forms, page)
}

fn errors(env: &Env, scope: NodeId) -> Vec<String> {
    env.dom.query_all(scope, &Selector::Class(FORM_ERROR_CLASS)).into_iter().map(|n| env.dom.text(n)).collect()
}

fn blur(env: &mut Env, forms: &mut FormController, target: NodeId) {
    forms.handle_event(env, &PageEvent::FocusOut { target, related: None }).unwrap();
}

// =============================================================
// Rules
// =============================================================

#[test]
fn email_rule_matches_simple_addresses() {
    assert!(is_valid_email("ada@example.com"));
    assert!(is_valid_email("a.b@c.d.e"));
    assert!(!is_valid_email("ada@example"));
    assert!(!is_valid_email("ada example@x.com"));
    assert!(!is_valid_email("@example.com"));
    assert!(!is_valid_email("ada@@example.com"));
    assert!(!is_valid_email("ada@.com"));
    assert!(!is_valid_email("ada@example."));
}

#[test]
fn required_beats_email_and_empty_optional_passes() {
    assert_eq!(field_error("   ", true, true), Some(REQUIRED_MESSAGE));
    assert_eq!(field_error("", false, true), None);
    assert_eq!(field_error("nope", false, true), Some(EMAIL_MESSAGE));
    assert_eq!(field_error("x", true, false), None);
}

// =============================================================
// Blur validation
// =============================================================

#[test]
fn blur_shows_single_inline_error() {
    let (mut env, mut forms, page) = setup();
    blur(&mut env, &mut forms, page.name);
    blur(&mut env, &mut forms, page.name);
    assert_eq!(errors(&env, page.form), vec![REQUIRED_MESSAGE.to_owned()]);
    assert!(env.dom.has_class(page.name, FIELD_ERROR_CLASS));
    assert_eq!(env.dom.attribute(page.name, "aria-invalid").as_deref(), Some("true"));
}

#[test]
fn fixing_the_value_clears_the_error() {
    let (mut env, mut forms, page) = setup();
    env.dom.set_value(page.email, "not-an-email").unwrap();
    blur(&mut env, &mut forms, page.email);
    assert_eq!(errors(&env, page.form), vec![EMAIL_MESSAGE.to_owned()]);

    env.dom.set_value(page.email, "ada@example.com").unwrap();
    blur(&mut env, &mut forms, page.email);
    assert!(errors(&env, page.form).is_empty());
    assert!(!env.dom.has_class(page.email, FIELD_ERROR_CLASS));
    assert_eq!(env.dom.attribute(page.email, "aria-invalid"), None);
}

#[test]
fn sibling_fields_keep_their_own_errors() {
    let mut dom = MemoryDom::new();
    let body = dom.body();
    let form = dom.build(body, "form").attr("data-validate", "").id();
    let name = dom.build(form, "input").attr("required", "").id();
    let email = dom.build(form, "input").attr("type", "email").attr("required", "").id();
    let mut env = fixtures::env(dom);
    let mut forms = FormController::new(&env);

    forms.submit(&mut env, form).unwrap();
    assert_eq!(errors(&env, form), vec![REQUIRED_MESSAGE.to_owned(), REQUIRED_MESSAGE.to_owned()]);
    assert!(forms.message_node(name).is_some());
    assert!(forms.message_node(email).is_some());

    env.dom.set_value(email, "ada@example.com").unwrap();
    blur(&mut env, &mut forms, email);
    assert_eq!(errors(&env, form), vec![REQUIRED_MESSAGE.to_owned()]);
    assert!(forms.message_node(email).is_none());
    let kept = forms.message_node(name).unwrap();
    assert!(env.dom.is_attached(kept));
    assert!(env.dom.has_class(name, FIELD_ERROR_CLASS));
}

// =============================================================
// Submit
// =============================================================

#[test]
fn invalid_submit_announces_and_focuses_first_error() {
    let (mut env, mut forms, page) = setup();
    env.dom.set_value(page.email, "bad").unwrap();
    assert!(forms.handle_event(&mut env, &PageEvent::Submit { form: page.form }).unwrap());
    assert_eq!(errors(&env, page.form).len(), 2);
    assert_eq!(announcements(&env), vec![REQUIRED_MESSAGE.to_owned()]);
    assert_eq!(env.dom.focused(), Some(page.name));
    assert!(!forms.is_submitting(page.form));
    assert!(env.take_effects().is_empty());
}

#[test]
fn valid_submit_loads_then_resets_with_toast() {
    let (mut env, mut forms, page) = setup();
    env.dom.set_value(page.name, "Ada").unwrap();
    env.dom.set_value(page.email, "ada@example.com").unwrap();
    assert!(forms.handle_event(&mut env, &PageEvent::Submit { form: page.form }).unwrap());
    assert!(forms.is_submitting(page.form));
    assert_eq!(
        env.take_effects(),
        vec![Effect::ShowButtonLoading { button: page.button, label: Some("Sending...".to_owned()) }]
    );

    run_for(&mut env, &mut forms, 1000);
    assert!(!forms.is_submitting(page.form));
    assert_eq!(env.take_effects(), vec![Effect::HideButtonLoading { button: page.button }]);
    assert_eq!(env.dom.value(page.name), "");
    assert_eq!(env.dom.value(page.email), "");
    assert_eq!(toast_messages(&env), vec![SUBMITTED_MESSAGE.to_owned()]);
}

#[test]
fn double_submit_keeps_one_pending_submission() {
    let (mut env, mut forms, page) = setup();
    env.dom.set_value(page.name, "Ada").unwrap();
    forms.submit(&mut env, page.form).unwrap();
    forms.submit(&mut env, page.form).unwrap();
    assert_eq!(env.timers.count(|t| matches!(t, Task::Form(_))), 1);
    assert_eq!(env.take_effects().len(), 1);
}

#[test]
fn removed_form_does_not_complete() {
    let (mut env, mut forms, page) = setup();
    env.dom.set_value(page.name, "Ada").unwrap();
    forms.submit(&mut env, page.form).unwrap();
    env.take_effects();
    env.dom.remove(page.form).unwrap();
    run_for(&mut env, &mut forms, 1000);
    assert!(env.take_effects().is_empty());
    assert!(toast_messages(&env).is_empty());
}

#[test]
fn page_without_forms_is_inert() {
    let env = fixtures::env(MemoryDom::new());
    assert!(FormController::new(&env).is_inert());
}
