//! Screen-reader announcements.
//!
//! Each announcement gets its own live-region node under `<body>`, removed
//! a fixed delay later. Announcements never queue behind or cancel each
//! other; a burst of three produces three nodes with three removal timers.

#[cfg(test)]
#[path = "announce_test.rs"]
mod announce_test;

use crate::dom::{Dom, NodeId};
use crate::error::DomError;
use crate::timer::{Task, TimerQueue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Politeness {
    #[default]
    Polite,
    Assertive,
}

impl Politeness {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Polite => "polite",
            Self::Assertive => "assertive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub message: String,
    pub politeness: Politeness,
}

impl Announcement {
    #[must_use]
    pub fn polite(message: impl Into<String>) -> Self {
        Self { message: message.into(), politeness: Politeness::Polite }
    }

    #[must_use]
    pub fn assertive(message: impl Into<String>) -> Self {
        Self { message: message.into(), politeness: Politeness::Assertive }
    }
}

/// Class that visually hides live-region nodes.
pub const SR_ONLY_CLASS: &str = "sr-only";

#[derive(Debug, Clone)]
pub struct Announcer {
    lifetime_ms: u64,
}

impl Announcer {
    #[must_use]
    pub fn new(lifetime_ms: u64) -> Self {
        Self { lifetime_ms }
    }

    /// Mount a live region carrying `announcement` and schedule its removal.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the node cannot be created or mounted; nothing is
    /// scheduled in that case.
    pub fn announce(
        &self,
        dom: &mut dyn Dom,
        timers: &mut TimerQueue,
        announcement: &Announcement,
    ) -> Result<NodeId, DomError> {
        let node = dom.create_element("div")?;
        dom.set_attribute(node, "role", "status")?;
        dom.set_attribute(node, "aria-live", announcement.politeness.as_str())?;
        dom.set_attribute(node, "aria-atomic", "true")?;
        dom.toggle_class(node, SR_ONLY_CLASS, true)?;
        dom.set_text(node, &announcement.message)?;
        let body = dom.body();
        dom.append_child(body, node)?;
        timers.schedule(self.lifetime_ms, Task::Announcement(node));
        log::debug!("announce ({}): {}", announcement.politeness.as_str(), announcement.message);
        Ok(node)
    }

    /// Remove an announcement node whose lifetime ended.
    pub fn expire(dom: &mut dyn Dom, node: NodeId) {
        if !dom.is_attached(node) {
            return;
        }
        if let Err(err) = dom.remove(node) {
            log::warn!("could not remove announcement node: {err}");
        }
    }
}
