//! Collaborators passed to every controller operation.
//!
//! `Env` is owned by `App` and lent to one controller at a time. Controllers
//! reach the DOM, the timer queue, the visibility trigger and the two
//! notification channels through it, and push [`Effect`]s for anything the
//! orchestrator has to route onward.

use crate::announce::{Announcement, Announcer};
use crate::clipboard::Clipboard;
use crate::config::PageConfig;
use crate::dom::Dom;
use crate::event::Effect;
use crate::storage::Store;
use crate::timer::TimerQueue;
use crate::toast::{NotificationCenter, Toast, ToastId, ToastKind};
use crate::visibility::VisibilityTrigger;

/// User media preferences sampled at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MediaPrefs {
    /// `prefers-color-scheme: dark`
    pub prefers_dark: bool,
    /// `prefers-reduced-motion: reduce`
    pub reduced_motion: bool,
}

pub struct Env {
    pub dom: Box<dyn Dom>,
    pub timers: TimerQueue,
    pub visibility: VisibilityTrigger,
    pub announcer: Announcer,
    pub toasts: NotificationCenter,
    pub store: Store,
    pub clipboard: Box<dyn Clipboard>,
    pub config: PageConfig,
    pub prefs: MediaPrefs,
    outbox: Vec<Effect>,
}

impl std::fmt::Debug for Env {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Env")
            .field("now_ms", &self.timers.now_ms())
            .field("pending_timers", &self.timers.len())
            .field("prefs", &self.prefs)
            .finish_non_exhaustive()
    }
}

impl Env {
    #[must_use]
    pub fn new(
        dom: Box<dyn Dom>,
        store: Store,
        clipboard: Box<dyn Clipboard>,
        config: PageConfig,
        prefs: MediaPrefs,
    ) -> Self {
        Self {
            dom,
            timers: TimerQueue::new(),
            visibility: VisibilityTrigger::new(),
            announcer: Announcer::new(config.announcement_ms),
            toasts: NotificationCenter::new(config.toast_exit_ms),
            store,
            clipboard,
            config,
            prefs,
            outbox: Vec::new(),
        }
    }

    /// Polite announcement. Failures are logged, never propagated.
    pub fn announce(&mut self, message: impl Into<String>) {
        self.send(&Announcement::polite(message));
    }

    pub fn announce_assertive(&mut self, message: impl Into<String>) {
        self.send(&Announcement::assertive(message));
    }

    /// Show a toast with the configured default lifetime.
    pub fn toast(&mut self, message: impl Into<String>, kind: ToastKind) -> Option<ToastId> {
        let toast = Toast::new(message, kind, self.config.toast_ms);
        self.show_toast(&toast)
    }

    pub fn show_toast(&mut self, toast: &Toast) -> Option<ToastId> {
        match self.toasts.show(self.dom.as_mut(), &mut self.timers, toast) {
            Ok(id) => Some(id),
            Err(err) => {
                log::warn!("toast could not be shown: {err}");
                None
            }
        }
    }

    pub fn emit(&mut self, effect: Effect) {
        self.outbox.push(effect);
    }

    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.outbox)
    }

    fn send(&mut self, announcement: &Announcement) {
        if let Err(err) = self.announcer.announce(self.dom.as_mut(), &mut self.timers, announcement) {
            log::warn!("announcement dropped: {err}");
        }
    }
}
