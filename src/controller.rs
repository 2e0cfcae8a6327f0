//! The capability every widget controller implements.
//!
//! Lifecycle: construct (locate anchors, register observers, reflect initial
//! state) → handle events, timers and visibility signals → teardown (disarm
//! every timer, drop every registration). A controller whose root anchor was
//! absent is inert and treats every call as a no-op.

#[cfg(test)]
#[path = "controller_test.rs"]
mod controller_test;

use crate::env::Env;
use crate::error::WidgetError;
use crate::event::{Key, PageEvent};
use crate::timer::{Task, TimerId};
use crate::visibility::VisibilitySignal;

pub trait Controller {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Whether the root anchor was absent at construction.
    fn is_inert(&self) -> bool;

    /// React to a host event. Returns whether the default action should be
    /// prevented.
    ///
    /// # Errors
    ///
    /// Returns `Err` when the DOM reflection of a change failed. The
    /// controller has already restored its previous reflection.
    fn handle_event(&mut self, env: &mut Env, event: &PageEvent) -> Result<bool, WidgetError>;

    /// A timer this controller armed has fired.
    ///
    /// # Errors
    ///
    /// Same contract as [`Controller::handle_event`].
    fn on_timer(&mut self, _env: &mut Env, _id: TimerId, _task: Task) -> Result<(), WidgetError> {
        Ok(())
    }

    /// A visibility registration this controller holds crossed its threshold.
    ///
    /// # Errors
    ///
    /// Same contract as [`Controller::handle_event`].
    fn on_visibility(&mut self, _env: &mut Env, _signal: &VisibilitySignal) -> Result<(), WidgetError> {
        Ok(())
    }

    /// Disarm timers and drop observer registrations.
    fn teardown(&mut self, env: &mut Env);
}

/// Arrow-key direction a roving-focus group responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// ArrowLeft / ArrowRight
    Horizontal,
    /// ArrowUp / ArrowDown
    Vertical,
}

/// Index a roving-focus key press moves to, wrapping at both ends.
///
/// Home and End jump to the first and last item. Keys off the axis, and
/// empty groups, yield `None`.
#[must_use]
pub fn roving_target(key: Key, axis: Axis, current: usize, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let current = current.min(len - 1);
    match (axis, key) {
        (Axis::Horizontal, Key::ArrowRight) | (Axis::Vertical, Key::ArrowDown) => Some((current + 1) % len),
        (Axis::Horizontal, Key::ArrowLeft) | (Axis::Vertical, Key::ArrowUp) => Some((current + len - 1) % len),
        (_, Key::Home) => Some(0),
        (_, Key::End) => Some(len - 1),
        _ => None,
    }
}
