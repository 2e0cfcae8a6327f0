use super::*;
use crate::dom::Dom;
use crate::fixtures;
use crate::memory_dom::MemoryDom;

fn setup() -> (Env, LoadingController, NodeId, NodeId) {
    let mut dom = MemoryDom::new();
    let body = dom.body();
    let section = dom.build(body, "section").class("results").id();
    let button = dom.build(section, "button").attr("type", "submit").text("Send").id();
    (fixtures::env(dom), LoadingController::new(), button, section)
}

fn overlays(env: &Env, section: NodeId) -> usize {
    env.dom.query_all(section, &LOADING_OVERLAY).len()
}

// =============================================================
// Buttons
// =============================================================

#[test]
fn button_loading_round_trip_restores_label() {
    let (mut env, mut loading, button, _) = setup();
    loading.show_button_loading(&mut env, button, Some("Sending...")).unwrap();
    assert!(loading.is_button_loading(button));
    assert_eq!(env.dom.text(button), "Sending...");
    assert!(env.dom.has_class(button, LOADING_CLASS));
    assert_eq!(env.dom.attribute(button, "aria-busy").as_deref(), Some("true"));
    assert!(env.dom.attribute(button, "disabled").is_some());

    loading.hide_button_loading(&mut env, button).unwrap();
    assert_eq!(env.dom.text(button), "Send");
    assert!(!env.dom.has_class(button, LOADING_CLASS));
    assert_eq!(env.dom.attribute(button, "aria-busy"), None);
    assert_eq!(env.dom.attribute(button, "disabled"), None);
}

#[test]
fn second_show_refreshes_label_but_keeps_capture() {
    let (mut env, mut loading, button, _) = setup();
    loading.show_button_loading(&mut env, button, None).unwrap();
    assert_eq!(env.dom.text(button), "Loading...");
    loading.show_button_loading(&mut env, button, Some("Almost there")).unwrap();
    assert_eq!(env.dom.text(button), "Almost there");

    loading.hide_button_loading(&mut env, button).unwrap();
    assert_eq!(env.dom.text(button), "Send");
}

#[test]
fn hide_without_show_is_noop() {
    let (mut env, mut loading, button, _) = setup();
    loading.hide_button_loading(&mut env, button).unwrap();
    assert_eq!(env.dom.text(button), "Send");
}

#[test]
fn detached_button_is_forgotten() {
    let (mut env, mut loading, button, _) = setup();
    loading.show_button_loading(&mut env, button, None).unwrap();
    env.dom.remove(button).unwrap();
    loading.hide_button_loading(&mut env, button).unwrap();
    assert!(!loading.is_button_loading(button));
}

// =============================================================
// Sections
// =============================================================

#[test]
fn section_gets_single_overlay() {
    let (mut env, mut loading, _, section) = setup();
    loading.show_section_loading(&mut env, section).unwrap();
    loading.show_section_loading(&mut env, section).unwrap();
    assert_eq!(overlays(&env, section), 1);
    assert_eq!(env.dom.attribute(section, "aria-busy").as_deref(), Some("true"));

    loading.hide_section_loading(&mut env, section).unwrap();
    assert_eq!(overlays(&env, section), 0);
    assert_eq!(env.dom.attribute(section, "aria-busy"), None);
}

#[test]
fn teardown_forgets_captured_labels() {
    let (mut env, mut loading, button, _) = setup();
    loading.show_button_loading(&mut env, button, None).unwrap();
    loading.teardown(&mut env);
    assert!(!loading.is_button_loading(button));
}
