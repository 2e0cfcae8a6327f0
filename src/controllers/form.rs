//! Client-side validation for `form[data-validate]`.
//!
//! Fields are checked when they lose focus and all together on submit. A
//! valid submit is simulated: the submit button shows a loading state, and
//! after a short delay the form is reset and a success toast appears.

#[cfg(test)]
#[path = "form_test.rs"]
mod form_test;

use std::collections::HashMap;

use crate::controller::Controller;
use crate::dom::{Dom, NodeId};
use crate::env::Env;
use crate::error::{DomError, WidgetError};
use crate::event::{Effect, PageEvent};
use crate::selectors::{FIELD_ERROR_CLASS, FORM_ERROR_CLASS, FORM_FIELD, SUBMIT_BUTTON, VALIDATED_FORM};
use crate::timer::{Task, TimerId, TimerSlots};
use crate::toast::ToastKind;

const NAME: &str = "form";

pub const REQUIRED_MESSAGE: &str = "This field is required";
pub const EMAIL_MESSAGE: &str = "Please enter a valid email";
pub const SUBMITTED_MESSAGE: &str = "Form submitted successfully!";
const SUBMITTING_LABEL: &str = "Sending...";

/// `local@domain.tld` with no whitespace and a single `@`.
#[must_use]
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain.char_indices().any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// The first rule `value` breaks, if any.
#[must_use]
pub fn field_error(value: &str, required: bool, email: bool) -> Option<&'static str> {
    let value = value.trim();
    if required && value.is_empty() {
        return Some(REQUIRED_MESSAGE);
    }
    if email && !value.is_empty() && !is_valid_email(value) {
        return Some(EMAIL_MESSAGE);
    }
    None
}

#[derive(Debug)]
pub struct FormController {
    forms: Vec<NodeId>,
    submitting: TimerSlots<NodeId>,
    /// Field -> the error node shown for it.
    messages: HashMap<NodeId, NodeId>,
}

impl FormController {
    #[must_use]
    pub fn new(env: &Env) -> Self {
        let dom = env.dom.as_ref();
        let forms = dom.query_all(dom.body(), &VALIDATED_FORM);
        if forms.is_empty() {
            log::debug!("{NAME}: no validated forms, inert");
        }
        Self { forms, submitting: TimerSlots::new(), messages: HashMap::new() }
    }

    #[must_use]
    pub fn is_submitting(&self, form: NodeId) -> bool {
        self.submitting.is_armed(form)
    }

    /// Validate one field and reflect the outcome. Returns the message shown,
    /// if any.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the error reflection failed.
    pub fn validate_field(&mut self, env: &mut Env, field: NodeId) -> Result<Option<&'static str>, WidgetError> {
        let dom = env.dom.as_mut();
        self.clear_error(dom, field)?;
        let required = dom.attribute(field, "required").is_some();
        let email = dom.attribute(field, "type").is_some_and(|t| t.eq_ignore_ascii_case("email"));
        let message = field_error(&dom.value(field), required, email);
        if let Some(message) = message {
            if let Some(node) = show_error(dom, field, message)? {
                self.messages.insert(field, node);
            }
        }
        Ok(message)
    }

    /// Error node currently shown for `field`.
    #[must_use]
    pub fn message_node(&self, field: NodeId) -> Option<NodeId> {
        self.messages.get(&field).copied()
    }

    fn clear_error(&mut self, dom: &mut dyn Dom, field: NodeId) -> Result<(), DomError> {
        dom.toggle_class(field, FIELD_ERROR_CLASS, false)?;
        dom.remove_attribute(field, "aria-invalid")?;
        if let Some(node) = self.messages.remove(&field) {
            if dom.is_attached(node) {
                dom.remove(node)?;
            }
        }
        Ok(())
    }

    /// Validate every field of `form`. On failure the first error is
    /// announced and its field focused; on success the simulated submission
    /// starts. Returns whether the form was valid.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a DOM write failed.
    pub fn submit(&mut self, env: &mut Env, form: NodeId) -> Result<bool, WidgetError> {
        let fields = env.dom.query_all(form, &FORM_FIELD);
        let mut first_error = None;
        for field in fields {
            if let Some(message) = self.validate_field(env, field)? {
                if first_error.is_none() {
                    first_error = Some((field, message));
                }
            }
        }
        if let Some((field, message)) = first_error {
            env.announce_assertive(message);
            env.dom.focus(field)?;
            return Ok(false);
        }
        if self.submitting.is_armed(form) {
            return Ok(true);
        }
        if let Some(button) = env.dom.query(form, &SUBMIT_BUTTON) {
            env.emit(Effect::ShowButtonLoading { button, label: Some(SUBMITTING_LABEL.to_owned()) });
        }
        self.submitting.arm(&mut env.timers, form, env.config.submit_ms, Task::Form(form));
        log::info!("{NAME}: submitting {form:?}");
        Ok(true)
    }

    fn complete(env: &mut Env, form: NodeId) -> Result<(), WidgetError> {
        if let Some(button) = env.dom.query(form, &SUBMIT_BUTTON) {
            env.emit(Effect::HideButtonLoading { button });
        }
        for field in env.dom.query_all(form, &FORM_FIELD) {
            let kind = env.dom.attribute(field, "type").unwrap_or_default();
            if !matches!(kind.as_str(), "submit" | "button" | "hidden") {
                env.dom.set_value(field, "")?;
            }
        }
        env.toast(SUBMITTED_MESSAGE, ToastKind::Success);
        Ok(())
    }

    fn owning_form(&self, dom: &dyn Dom, node: NodeId) -> Option<NodeId> {
        self.forms.iter().copied().find(|f| dom.contains(*f, node))
    }
}

/// Mark `field` invalid and append its message next to it. Returns the
/// message node, or `None` for a field with no parent.
fn show_error(dom: &mut dyn Dom, field: NodeId, message: &str) -> Result<Option<NodeId>, DomError> {
    dom.toggle_class(field, FIELD_ERROR_CLASS, true)?;
    dom.set_flag(field, "aria-invalid", true)?;
    let Some(parent) = dom.parent(field) else {
        return Ok(None);
    };
    let node = dom.create_element("span")?;
    dom.set_attribute(node, "class", FORM_ERROR_CLASS)?;
    dom.set_attribute(node, "role", "alert")?;
    dom.set_text(node, message)?;
    dom.append_child(parent, node)?;
    Ok(Some(node))
}

impl Controller for FormController {
    fn name(&self) -> &'static str {
        NAME
    }

    fn is_inert(&self) -> bool {
        self.forms.is_empty()
    }

    fn handle_event(&mut self, env: &mut Env, event: &PageEvent) -> Result<bool, WidgetError> {
        match *event {
            PageEvent::Submit { form } if self.forms.contains(&form) => {
                self.submit(env, form)?;
                Ok(true)
            }
            PageEvent::FocusOut { target, .. } => {
                if env.dom.matches(target, &FORM_FIELD) && self.owning_form(env.dom.as_ref(), target).is_some() {
                    self.validate_field(env, target)?;
                }
                Ok(false)
            }
            _ => Ok(false),
        }
    }

    fn on_timer(&mut self, env: &mut Env, id: TimerId, task: Task) -> Result<(), WidgetError> {
        let Task::Form(form) = task else {
            return Ok(());
        };
        if !self.submitting.settle(form, id) || !env.dom.is_attached(form) {
            return Ok(());
        }
        Self::complete(env, form)
    }

    fn teardown(&mut self, env: &mut Env) {
        self.submitting.disarm_all(&mut env.timers);
        self.messages.clear();
    }
}
