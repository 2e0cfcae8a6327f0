//! Visible toast notifications.
//!
//! Lifecycle: mount → (optional) auto-dismiss timer → exit transition →
//! detach. An explicit close cancels the pending auto-dismiss before it
//! starts the exit, so a toast is only ever detached once.

#[cfg(test)]
#[path = "toast_test.rs"]
mod toast_test;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dom::{Dom, NodeId, Selector};
use crate::error::DomError;
use crate::timer::{Task, TimerId, TimerQueue};

pub const CONTAINER_ID: &str = "toastContainer";
pub const CLOSE_SELECTOR: Selector = Selector::Class("toast-close");
pub const EXIT_CLASS: &str = "toast-exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Warning,
    Error,
    #[default]
    Info,
}

impl ToastKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    /// 0 keeps the toast until it is closed.
    pub duration_ms: u64,
}

impl Toast {
    #[must_use]
    pub fn new(message: impl Into<String>, kind: ToastKind, duration_ms: u64) -> Self {
        Self { message: message.into(), kind, duration_ms }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToastId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToastStage {
    AutoDismiss,
    Detach,
}

#[derive(Debug, Clone)]
struct Mounted {
    node: NodeId,
    close_button: NodeId,
    dismiss: Option<TimerId>,
    closing: bool,
}

#[derive(Debug, Clone)]
pub struct NotificationCenter {
    exit_ms: u64,
    next_id: u64,
    mounted: BTreeMap<ToastId, Mounted>,
}

impl NotificationCenter {
    #[must_use]
    pub fn new(exit_ms: u64) -> Self {
        Self { exit_ms, next_id: 0, mounted: BTreeMap::new() }
    }

    /// Mount `toast` in the container, creating the container if needed.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the toast cannot be built or mounted.
    pub fn show(&mut self, dom: &mut dyn Dom, timers: &mut TimerQueue, toast: &Toast) -> Result<ToastId, DomError> {
        let container = Self::ensure_container(dom)?;

        let node = dom.create_element("div")?;
        dom.toggle_class(node, "toast", true)?;
        dom.toggle_class(node, &format!("toast-{}", toast.kind.as_str()), true)?;
        let role = if toast.kind == ToastKind::Error { "alert" } else { "status" };
        dom.set_attribute(node, "role", role)?;

        let message = dom.create_element("span")?;
        dom.toggle_class(message, "toast-message", true)?;
        dom.set_text(message, &toast.message)?;
        dom.append_child(node, message)?;

        let close_button = dom.create_element("button")?;
        dom.toggle_class(close_button, "toast-close", true)?;
        dom.set_attribute(close_button, "type", "button")?;
        dom.set_attribute(close_button, "aria-label", "Close notification")?;
        dom.set_text(close_button, "\u{d7}")?;
        dom.append_child(node, close_button)?;

        dom.append_child(container, node)?;

        self.next_id += 1;
        let id = ToastId(self.next_id);
        let dismiss =
            (toast.duration_ms > 0).then(|| timers.schedule(toast.duration_ms, Task::Toast(id, ToastStage::AutoDismiss)));
        self.mounted.insert(id, Mounted { node, close_button, dismiss, closing: false });
        log::debug!("toast {id:?} ({}): {}", toast.kind.as_str(), toast.message);
        Ok(id)
    }

    /// Start the exit transition. Returns `false` if the toast is already
    /// closing or gone.
    pub fn close(&mut self, dom: &mut dyn Dom, timers: &mut TimerQueue, id: ToastId) -> bool {
        let Some(toast) = self.mounted.get_mut(&id) else {
            return false;
        };
        if toast.closing {
            return false;
        }
        if let Some(timer) = toast.dismiss.take() {
            timers.cancel(timer);
        }
        toast.closing = true;
        if let Err(err) = dom.toggle_class(toast.node, EXIT_CLASS, true) {
            log::warn!("toast exit transition skipped: {err}");
        }
        timers.schedule(self.exit_ms, Task::Toast(id, ToastStage::Detach));
        true
    }

    pub fn on_timer(&mut self, dom: &mut dyn Dom, timers: &mut TimerQueue, id: ToastId, stage: ToastStage) {
        match stage {
            ToastStage::AutoDismiss => {
                if let Some(toast) = self.mounted.get_mut(&id) {
                    toast.dismiss = None;
                }
                self.close(dom, timers, id);
            }
            ToastStage::Detach => {
                let Some(toast) = self.mounted.remove(&id) else {
                    return;
                };
                if dom.is_attached(toast.node)
                    && let Err(err) = dom.remove(toast.node)
                {
                    log::warn!("could not detach toast: {err}");
                }
            }
        }
    }

    /// Route a click on a close button. Returns whether it was consumed.
    pub fn handle_click(&mut self, dom: &mut dyn Dom, timers: &mut TimerQueue, target: NodeId) -> bool {
        let Some(button) = dom.closest(target, &CLOSE_SELECTOR) else {
            return false;
        };
        let found = self.mounted.iter().find(|(_, t)| t.close_button == button).map(|(id, _)| *id);
        match found {
            Some(id) => {
                self.close(dom, timers, id);
                true
            }
            None => false,
        }
    }

    /// Toasts mounted and not yet detached (closing ones included).
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.mounted.len()
    }

    #[must_use]
    pub fn node(&self, id: ToastId) -> Option<NodeId> {
        self.mounted.get(&id).map(|t| t.node)
    }

    fn ensure_container(dom: &mut dyn Dom) -> Result<NodeId, DomError> {
        if let Some(existing) = dom.get_by_id(CONTAINER_ID) {
            return Ok(existing);
        }
        let container = dom.create_element("div")?;
        dom.set_attribute(container, "id", CONTAINER_ID)?;
        dom.toggle_class(container, "toast-container", true)?;
        let body = dom.body();
        dom.append_child(body, container)?;
        Ok(container)
    }
}
