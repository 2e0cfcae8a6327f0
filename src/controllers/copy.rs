//! Click-to-copy affordances.
//!
//! `[data-copy]` copies its attribute value; `.icon-item[data-icon]` copies
//! an SVG `<use>` snippet for the named icon; `.color-card[data-color]`
//! copies a declaration of the named custom property with the value the page
//! resolves for it. A successful copy shows a
//! success toast and flags the element `copied` for a moment. Without a
//! usable clipboard the value is shown in an informational toast instead.

#[cfg(test)]
#[path = "copy_test.rs"]
mod copy_test;

use crate::controller::Controller;
use crate::dom::NodeId;
use crate::env::Env;
use crate::error::WidgetError;
use crate::event::PageEvent;
use crate::selectors::{COLOR_CARD, COPIED_CLASS, COPY_ICON, COPY_TARGET, COPY_VALUE};
use crate::timer::{Task, TimerId, TimerSlots};
use crate::toast::ToastKind;

const NAME: &str = "copy";

/// What a copy affordance puts on the clipboard, and how the toast names it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub text: String,
    pub confirmation: String,
}

impl Payload {
    #[must_use]
    pub fn value(value: &str) -> Self {
        Self { text: value.to_owned(), confirmation: format!("Copied: {value}") }
    }

    #[must_use]
    pub fn icon(name: &str) -> Self {
        Self {
            text: format!("<svg class=\"icon icon-md\">\n    <use href=\"#icon-{name}\"></use>\n</svg>"),
            confirmation: format!("Copied icon: {name}"),
        }
    }

    /// `--token: value;` for a design token.
    #[must_use]
    pub fn color(token: &str, value: &str) -> Self {
        Self { text: format!("{token}: {value};"), confirmation: format!("Copied: {token}") }
    }
}

#[derive(Debug)]
pub struct CopyController {
    present: bool,
    feedback: TimerSlots<NodeId>,
}

impl CopyController {
    #[must_use]
    pub fn new(env: &Env) -> Self {
        let dom = env.dom.as_ref();
        let present = dom.query(dom.body(), &COPY_TARGET).is_some();
        if !present {
            log::debug!("{NAME}: no copy targets, inert");
        }
        Self { present, feedback: TimerSlots::new() }
    }

    /// Copy what `node` offers. Returns whether the clipboard accepted it.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the feedback class could not be written.
    pub fn copy(&mut self, env: &mut Env, node: NodeId) -> Result<bool, WidgetError> {
        let Some(payload) = payload_for(env, node) else {
            return Ok(false);
        };
        match env.clipboard.write_text(&payload.text) {
            Ok(()) => {
                env.toast(payload.confirmation, ToastKind::Success);
                env.dom.toggle_class(node, COPIED_CLASS, true)?;
                self.feedback.arm(&mut env.timers, node, env.config.copy_feedback_ms, Task::Copy(node));
                Ok(true)
            }
            Err(err) => {
                log::warn!("{NAME}: clipboard write failed: {err}");
                env.toast(format!("Copy this manually: {}", payload.text), ToastKind::Info);
                Ok(false)
            }
        }
    }
}

fn payload_for(env: &Env, node: NodeId) -> Option<Payload> {
    let dom = env.dom.as_ref();
    if dom.matches(node, &COLOR_CARD) {
        let token = dom.attribute(node, "data-color")?;
        let token = token.trim();
        let value = dom.computed_style(dom.document_element(), token).unwrap_or_default();
        return Some(Payload::color(token, value.trim()));
    }
    if dom.matches(node, &COPY_VALUE) {
        return dom.attribute(node, "data-copy").map(|v| Payload::value(&v));
    }
    if dom.matches(node, &COPY_ICON) {
        return dom.attribute(node, "data-icon").map(|name| Payload::icon(&name));
    }
    None
}

impl Controller for CopyController {
    fn name(&self) -> &'static str {
        NAME
    }

    fn is_inert(&self) -> bool {
        !self.present
    }

    fn handle_event(&mut self, env: &mut Env, event: &PageEvent) -> Result<bool, WidgetError> {
        if !self.present {
            return Ok(false);
        }
        let PageEvent::Click { target } = *event else {
            return Ok(false);
        };
        if let Some(node) = env.dom.closest(target, &COPY_TARGET) {
            self.copy(env, node)?;
        }
        Ok(false)
    }

    fn on_timer(&mut self, env: &mut Env, id: TimerId, task: Task) -> Result<(), WidgetError> {
        let Task::Copy(node) = task else {
            return Ok(());
        };
        if !self.feedback.settle(node, id) || !env.dom.is_attached(node) {
            return Ok(());
        }
        env.dom.toggle_class(node, COPIED_CLASS, false)?;
        Ok(())
    }

    fn teardown(&mut self, env: &mut Env) {
        self.feedback.disarm_all(&mut env.timers);
    }
}
