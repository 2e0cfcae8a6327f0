//! The page dialog (`#modal`).
//!
//! Opening fills the title and body, locks body scroll, and moves focus into
//! the dialog; closing gives focus back to whatever opened it. While open,
//! Tab and Shift+Tab wrap between the first and last focusable elements.

#[cfg(test)]
#[path = "modal_test.rs"]
mod modal_test;

use crate::controller::Controller;
use crate::dom::{Dom, NodeId};
use crate::env::Env;
use crate::error::WidgetError;
use crate::event::{Key, PageEvent};
use crate::selectors::{ACTIVE_CLASS, FOCUSABLE, MODAL_BODY, MODAL_CLOSE, MODAL_ID, MODAL_OPEN_BODY_CLASS, MODAL_TITLE, MODAL_TRIGGER};

const NAME: &str = "modal";

#[derive(Debug, Clone, Copy)]
struct Anchors {
    modal: NodeId,
    title: Option<NodeId>,
    body: Option<NodeId>,
    close: Option<NodeId>,
}

#[derive(Debug)]
pub struct ModalController {
    anchors: Option<Anchors>,
    open: bool,
    opener: Option<NodeId>,
}

impl ModalController {
    /// # Errors
    ///
    /// Returns `Err` if the initial closed state cannot be written.
    pub fn new(env: &mut Env) -> Result<Self, WidgetError> {
        let mut this = Self { anchors: None, open: false, opener: None };
        let dom = env.dom.as_ref();
        let Some(modal) = dom.get_by_id(MODAL_ID) else {
            log::debug!("{NAME}: no #{MODAL_ID}, inert");
            return Ok(this);
        };
        let anchors =
            Anchors { modal, title: dom.query(modal, &MODAL_TITLE), body: dom.query(modal, &MODAL_BODY), close: dom.query(modal, &MODAL_CLOSE) };
        let dom = env.dom.as_mut();
        dom.toggle_class(modal, ACTIVE_CLASS, false)?;
        dom.set_flag(modal, "aria-hidden", true)?;
        this.anchors = Some(anchors);
        Ok(this)
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Show the dialog with `title` and `body` text. `opener` receives focus
    /// back on close; when `None`, the element focused now is used.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a DOM write failed.
    pub fn open(&mut self, env: &mut Env, title: &str, body: &str, opener: Option<NodeId>) -> Result<(), WidgetError> {
        let Some(anchors) = self.anchors else {
            return Ok(());
        };
        let dom = env.dom.as_mut();
        if let Some(node) = anchors.title {
            dom.set_text(node, title)?;
        }
        if let Some(node) = anchors.body {
            dom.set_text(node, body)?;
        }
        if !self.open {
            self.opener = opener.or_else(|| dom.focused());
        }
        dom.toggle_class(anchors.modal, ACTIVE_CLASS, true)?;
        dom.set_flag(anchors.modal, "aria-hidden", false)?;
        let page = dom.body();
        dom.toggle_class(page, MODAL_OPEN_BODY_CLASS, true)?;
        self.open = true;

        let first = focusable(dom, anchors.modal).first().copied().unwrap_or(anchors.modal);
        dom.focus(first)?;
        log::debug!("{NAME}: opened {title:?}");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `Err` if a DOM write failed.
    pub fn close(&mut self, env: &mut Env) -> Result<(), WidgetError> {
        let Some(anchors) = self.anchors else {
            return Ok(());
        };
        if !self.open {
            return Ok(());
        }
        let dom = env.dom.as_mut();
        dom.toggle_class(anchors.modal, ACTIVE_CLASS, false)?;
        dom.set_flag(anchors.modal, "aria-hidden", true)?;
        let page = dom.body();
        dom.toggle_class(page, MODAL_OPEN_BODY_CLASS, false)?;
        self.open = false;
        if let Some(opener) = self.opener.take().filter(|o| dom.is_attached(*o)) {
            dom.focus(opener)?;
        }
        Ok(())
    }

    /// Wrap Tab / Shift+Tab at the dialog's edges. Returns whether focus was
    /// moved.
    fn trap_focus(dom: &mut dyn Dom, modal: NodeId, backwards: bool) -> Result<bool, WidgetError> {
        let items = focusable(dom, modal);
        let (Some(first), Some(last)) = (items.first().copied(), items.last().copied()) else {
            return Ok(false);
        };
        let current = dom.focused();
        let wrap_to = if backwards && current == Some(first) {
            Some(last)
        } else if !backwards && current == Some(last) {
            Some(first)
        } else if current.is_none_or(|c| !dom.contains(modal, c)) {
            Some(if backwards { last } else { first })
        } else {
            None
        };
        match wrap_to {
            Some(node) => {
                dom.focus(node)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Keyboard-reachable elements inside `scope`, in document order.
fn focusable(dom: &dyn Dom, scope: NodeId) -> Vec<NodeId> {
    dom.query_all(scope, &FOCUSABLE)
        .into_iter()
        .filter(|n| dom.attribute(*n, "tabindex").as_deref() != Some("-1") && dom.attribute(*n, "disabled").is_none())
        .collect()
}

impl Controller for ModalController {
    fn name(&self) -> &'static str {
        NAME
    }

    fn is_inert(&self) -> bool {
        self.anchors.is_none()
    }

    fn handle_event(&mut self, env: &mut Env, event: &PageEvent) -> Result<bool, WidgetError> {
        let Some(anchors) = self.anchors else {
            return Ok(false);
        };
        match *event {
            PageEvent::Click { target } => {
                if self.open {
                    let on_close = anchors.close.is_some_and(|c| env.dom.contains(c, target));
                    if on_close || target == anchors.modal {
                        self.close(env)?;
                    }
                    return Ok(false);
                }
                let Some(trigger) = env.dom.closest(target, &MODAL_TRIGGER) else {
                    return Ok(false);
                };
                let title = env.dom.attribute(trigger, "data-modal-title").unwrap_or_default();
                let body = env.dom.attribute(trigger, "data-modal-body").unwrap_or_default();
                self.open(env, &title, &body, Some(trigger))?;
                Ok(true)
            }
            PageEvent::KeyDown { key: Key::Escape, .. } if self.open => {
                self.close(env)?;
                Ok(false)
            }
            PageEvent::KeyDown { key: Key::Tab, modifiers, .. } if self.open => {
                Self::trap_focus(env.dom.as_mut(), anchors.modal, modifiers.shift)
            }
            _ => Ok(false),
        }
    }

    fn teardown(&mut self, _env: &mut Env) {
        self.opener = None;
    }
}
