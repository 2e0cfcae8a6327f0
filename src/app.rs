//! Page orchestrator.
//!
//! SYSTEM CONTEXT
//! ==============
//! `App` owns the [`Env`], the [`SharedState`] handle and every controller.
//! The host feeds it [`PageEvent`]s through [`App::dispatch`] and moves the
//! clock with [`App::advance_to`]; `App` fans events out, routes due timers
//! and visibility signals to the controller that armed them, and drains the
//! effect outbox after every step.
//!
//! FAILURE BOUNDARY
//! ================
//! A controller that fails to construct is logged and left out; the rest of
//! the page still works and one fallback toast tells the user. After
//! construction no controller error escapes `dispatch` or `advance_to`.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use crate::announce::Announcer;
use crate::controller::Controller;
use crate::controllers::accordion::AccordionController;
use crate::controllers::animation::AnimationController;
use crate::controllers::carousel::CarouselController;
use crate::controllers::copy::CopyController;
use crate::controllers::filter::FilterController;
use crate::controllers::form::FormController;
use crate::controllers::loading::LoadingController;
use crate::controllers::modal::ModalController;
use crate::controllers::nav::NavController;
use crate::controllers::pricing::PricingController;
use crate::controllers::progress::ProgressController;
use crate::controllers::reveal::RevealController;
use crate::controllers::tabs::TabController;
use crate::controllers::theme::ThemeController;
use crate::dom::NodeId;
use crate::env::Env;
use crate::error::WidgetError;
use crate::event::{Broadcast, Effect, Key, Modifiers, PageEvent};
use crate::state::{self, SharedState, StateHandle};
use crate::timer::{Task, TimerId, TimerSlots};
use crate::toast::{Toast, ToastId, ToastKind};
use crate::visibility::Observer;

/// Shown once when one or more controllers failed to construct.
pub const FALLBACK_MESSAGE: &str = "Some features failed to load. Please refresh the page.";

pub const SHORTCUTS_TITLE: &str = "Keyboard Shortcuts";
pub const SHORTCUTS_BODY: &str = "Alt + T: Toggle theme\nEsc: Close modal or menu\nTab: Navigate elements";

/// Timers `App` arms for itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppTimer {
    ResizeDebounce,
}

type Listener = Box<dyn FnMut(&Broadcast)>;

// =============================================================================
// WIDGETS
// =============================================================================

/// Every controller, in construction order. `None` means construction failed.
struct Widgets {
    theme: Option<ThemeController>,
    nav: Option<NavController>,
    tabs: Option<TabController>,
    filter: Option<FilterController>,
    carousel: Option<CarouselController>,
    accordion: Option<AccordionController>,
    progress: Option<ProgressController>,
    loading: LoadingController,
    pricing: Option<PricingController>,
    modal: Option<ModalController>,
    copy: Option<CopyController>,
    form: Option<FormController>,
    reveal: Option<RevealController>,
    animation: Option<AnimationController>,
}

fn as_dyn<C: Controller>(ctrl: Option<&mut C>) -> Option<&mut dyn Controller> {
    ctrl.map(|c| c as &mut dyn Controller)
}

impl Widgets {
    fn all_mut(&mut self) -> impl Iterator<Item = &mut dyn Controller> {
        [
            as_dyn(self.theme.as_mut()),
            as_dyn(self.nav.as_mut()),
            as_dyn(self.tabs.as_mut()),
            as_dyn(self.filter.as_mut()),
            as_dyn(self.carousel.as_mut()),
            as_dyn(self.accordion.as_mut()),
            as_dyn(self.progress.as_mut()),
            Some(&mut self.loading as &mut dyn Controller),
            as_dyn(self.pricing.as_mut()),
            as_dyn(self.modal.as_mut()),
            as_dyn(self.copy.as_mut()),
            as_dyn(self.form.as_mut()),
            as_dyn(self.reveal.as_mut()),
            as_dyn(self.animation.as_mut()),
        ]
        .into_iter()
        .flatten()
    }

    fn timer_owner(&mut self, task: Task) -> Option<&mut dyn Controller> {
        match task {
            Task::Carousel(_) => as_dyn(self.carousel.as_mut()),
            Task::Theme(_) => as_dyn(self.theme.as_mut()),
            Task::Nav(_) => as_dyn(self.nav.as_mut()),
            Task::Progress(_) | Task::Counter(_) => as_dyn(self.progress.as_mut()),
            Task::Copy(_) => as_dyn(self.copy.as_mut()),
            Task::Form(_) => as_dyn(self.form.as_mut()),
            Task::Animation(_) => as_dyn(self.animation.as_mut()),
            Task::Announcement(_) | Task::Toast(..) | Task::App(_) => None,
        }
    }

    fn observer_owner(&mut self, owner: Observer) -> Option<&mut dyn Controller> {
        match owner {
            Observer::Carousel => as_dyn(self.carousel.as_mut()),
            Observer::ScrollSpy => as_dyn(self.nav.as_mut()),
            Observer::Progress | Observer::Counter => as_dyn(self.progress.as_mut()),
            Observer::Reveal | Observer::Lazy => as_dyn(self.reveal.as_mut()),
        }
    }
}

/// Keep a constructed controller, or log the failure and remember its name.
fn keep<C>(name: &'static str, built: Result<C, WidgetError>, failed: &mut Vec<&'static str>) -> Option<C> {
    match built {
        Ok(ctrl) => Some(ctrl),
        Err(err) => {
            log::error!("{name}: construction failed: {err}");
            failed.push(name);
            None
        }
    }
}

fn is_shortcut(key: Key, modifiers: Modifiers, letter: char) -> bool {
    modifiers.alt && !modifiers.ctrl && !modifiers.meta && matches!(key, Key::Char(c) if c.eq_ignore_ascii_case(&letter))
}

// =============================================================================
// APP
// =============================================================================

pub struct App {
    env: Env,
    state: StateHandle,
    widgets: Widgets,
    failed: Vec<&'static str>,
    listeners: Vec<Listener>,
    timers: TimerSlots<AppTimer>,
    pending_width: f64,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("env", &self.env)
            .field("state", &self.state)
            .field("failed", &self.failed)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl App {
    /// Construct every controller against `env`, in dependency order.
    #[must_use]
    pub fn new(mut env: Env) -> Self {
        let state = state::new_handle();
        state.borrow_mut().motion_enabled = !env.prefs.reduced_motion;

        let mut failed = Vec::new();
        let env_ref = &mut env;
        let widgets = Widgets {
            theme: keep("theme", ThemeController::new(env_ref, state.clone()), &mut failed),
            nav: keep("nav", NavController::new(env_ref, state.clone()), &mut failed),
            tabs: keep("tabs", TabController::new(env_ref, state.clone()), &mut failed),
            filter: keep("filter", FilterController::new(env_ref, state.clone()), &mut failed),
            carousel: keep("carousel", CarouselController::new(env_ref, state.clone()), &mut failed),
            accordion: keep("accordion", AccordionController::new(env_ref), &mut failed),
            progress: keep("progress", ProgressController::new(env_ref, state.clone()), &mut failed),
            loading: LoadingController::new(),
            pricing: keep("pricing", PricingController::new(env_ref, state.clone()), &mut failed),
            modal: keep("modal", ModalController::new(env_ref), &mut failed),
            copy: Some(CopyController::new(env_ref)),
            form: Some(FormController::new(env_ref)),
            reveal: keep("reveal", RevealController::new(env_ref, state.clone()), &mut failed),
            animation: Some(AnimationController::new(env_ref)),
        };

        if !failed.is_empty() {
            env.toast(FALLBACK_MESSAGE, ToastKind::Error);
        }
        log::info!("app: started ({} failed: {failed:?})", failed.len());

        let mut app = Self {
            env,
            state,
            widgets,
            failed,
            listeners: Vec::new(),
            timers: TimerSlots::new(),
            pending_width: 0.0,
        };
        app.drain_effects();
        app
    }

    // -------------------------------------------------------------------------
    // Host surface
    // -------------------------------------------------------------------------

    /// Route one host event. Returns whether the default action should be
    /// prevented.
    pub fn dispatch(&mut self, event: PageEvent) -> bool {
        let prevent = match event {
            PageEvent::Resize { width } => {
                self.pending_width = width;
                let delay = self.env.config.resize_debounce_ms;
                self.timers.arm(&mut self.env.timers, AppTimer::ResizeDebounce, delay, Task::App(AppTimer::ResizeDebounce));
                false
            }
            PageEvent::Intersection { target, ratio } => {
                self.report_visibility(target, ratio);
                false
            }
            PageEvent::BeforeUnload => {
                self.save_snapshot();
                false
            }
            PageEvent::KeyDown { key, modifiers, .. } if is_shortcut(key, modifiers, 't') => {
                self.toggle_theme();
                true
            }
            PageEvent::KeyDown { key, modifiers, .. } if is_shortcut(key, modifiers, 'm') => {
                self.open_modal(SHORTCUTS_TITLE, SHORTCUTS_BODY);
                true
            }
            PageEvent::Click { target } => {
                let env = &mut self.env;
                let closed = env.toasts.handle_click(env.dom.as_mut(), &mut env.timers, target);
                self.fan_out(&event) || closed
            }
            _ => {
                if let PageEvent::MotionPreferenceChange { reduced } = event {
                    self.state.borrow_mut().motion_enabled = !reduced;
                }
                self.fan_out(&event)
            }
        };
        self.drain_effects();
        prevent
    }

    /// Fire every timer due at or before `now` (milliseconds on the host clock).
    pub fn advance_to(&mut self, now: u64) {
        while let Some((id, task)) = self.env.timers.pop_due(now) {
            self.route_timer(id, task);
            self.drain_effects();
        }
        self.env.timers.advance_clock(now);
    }

    pub fn advance_by(&mut self, delta_ms: u64) {
        let now = self.env.timers.now_ms().saturating_add(delta_ms);
        self.advance_to(now);
    }

    /// Earliest pending timer deadline, for the host's wake-up timeout.
    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        self.env.timers.next_deadline()
    }

    /// Register a broadcast listener. It immediately receives the current
    /// theme when a theme controller is running.
    pub fn subscribe(&mut self, mut listener: impl FnMut(&Broadcast) + 'static) {
        if self.widgets.theme.is_some() {
            listener(&Broadcast::ThemeChanged { theme: self.state.borrow().theme });
        }
        self.listeners.push(Box::new(listener));
    }

    /// Disarm every timer and drop every observer registration.
    pub fn teardown(&mut self) {
        let env = &mut self.env;
        for ctrl in self.widgets.all_mut() {
            ctrl.teardown(env);
        }
        self.timers.disarm_all(&mut self.env.timers);
        log::info!("app: torn down");
    }

    // -------------------------------------------------------------------------
    // Cross-component calls
    // -------------------------------------------------------------------------

    pub fn show_toast(&mut self, message: &str, kind: ToastKind, duration_ms: Option<u64>) -> Option<ToastId> {
        let duration = duration_ms.unwrap_or(self.env.config.toast_ms);
        self.env.show_toast(&Toast::new(message, kind, duration))
    }

    pub fn close_toast(&mut self, id: ToastId) -> bool {
        self.env.toasts.close(self.env.dom.as_mut(), &mut self.env.timers, id)
    }

    pub fn announce(&mut self, message: &str) {
        self.env.announce(message);
    }

    /// Open the page dialog. Returns `false` when there is no dialog.
    pub fn open_modal(&mut self, title: &str, body: &str) -> bool {
        let Some(modal) = self.widgets.modal.as_mut().filter(|m| !m.is_inert()) else {
            log::debug!("app: no dialog to open");
            return false;
        };
        match modal.open(&mut self.env, title, body, None) {
            Ok(()) => true,
            Err(err) => {
                log::error!("modal: open failed: {err}");
                false
            }
        }
    }

    pub fn close_modal(&mut self) {
        if let Some(modal) = self.widgets.modal.as_mut()
            && let Err(err) = modal.close(&mut self.env)
        {
            log::error!("modal: close failed: {err}");
        }
    }

    pub fn set_progress(&mut self, target: NodeId, value: f64, animate: bool) {
        if let Some(progress) = self.widgets.progress.as_mut()
            && let Err(err) = progress.set_progress(&mut self.env, target, value, animate)
        {
            log::error!("progress: update failed: {err}");
        }
    }

    /// Add `amount` to a progress element's stored value, animated.
    pub fn increment_progress(&mut self, target: NodeId, amount: f64) {
        if let Some(progress) = self.widgets.progress.as_mut()
            && let Err(err) = progress.increment(&mut self.env, target, amount)
        {
            log::error!("progress: increment failed: {err}");
        }
    }

    pub fn show_section_loading(&mut self, section: NodeId) {
        if let Err(err) = self.widgets.loading.show_section_loading(&mut self.env, section) {
            log::error!("loading: {err}");
        }
    }

    pub fn hide_section_loading(&mut self, section: NodeId) {
        if let Err(err) = self.widgets.loading.hide_section_loading(&mut self.env, section) {
            log::error!("loading: {err}");
        }
    }

    /// Play every card of the animation showcase.
    pub fn play_animations(&mut self) {
        if let Some(animation) = self.widgets.animation.as_mut() {
            animation.play_all(&mut self.env);
        }
    }

    pub fn show_button_loading(&mut self, button: NodeId, label: Option<&str>) {
        if let Err(err) = self.widgets.loading.show_button_loading(&mut self.env, button, label) {
            log::error!("loading: {err}");
        }
    }

    pub fn hide_button_loading(&mut self, button: NodeId) {
        if let Err(err) = self.widgets.loading.hide_button_loading(&mut self.env, button) {
            log::error!("loading: {err}");
        }
    }

    pub fn toggle_theme(&mut self) {
        if let Some(theme) = self.widgets.theme.as_mut()
            && let Err(err) = theme.toggle_theme(&mut self.env)
        {
            log::error!("theme: toggle failed: {err}");
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Copy of the current shared state.
    #[must_use]
    pub fn state(&self) -> SharedState {
        self.state.borrow().clone()
    }

    /// Names of the controllers that failed to construct.
    #[must_use]
    pub fn failed(&self) -> &[&'static str] {
        &self.failed
    }

    #[must_use]
    pub fn env(&self) -> &Env {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Env {
        &mut self.env
    }

    #[must_use]
    pub fn carousel(&self) -> Option<&CarouselController> {
        self.widgets.carousel.as_ref()
    }

    #[must_use]
    pub fn theme(&self) -> Option<&ThemeController> {
        self.widgets.theme.as_ref()
    }

    // -------------------------------------------------------------------------
    // Routing
    // -------------------------------------------------------------------------

    fn fan_out(&mut self, event: &PageEvent) -> bool {
        let env = &mut self.env;
        let mut prevent = false;
        for ctrl in self.widgets.all_mut().filter(|c| !c.is_inert()) {
            match ctrl.handle_event(env, event) {
                Ok(handled) => prevent |= handled,
                Err(err) => log::error!("{}: event handler failed: {err}", ctrl.name()),
            }
        }
        prevent
    }

    fn route_timer(&mut self, id: TimerId, task: Task) {
        match task {
            Task::Announcement(node) => Announcer::expire(self.env.dom.as_mut(), node),
            Task::Toast(toast, stage) => self.env.toasts.on_timer(self.env.dom.as_mut(), &mut self.env.timers, toast, stage),
            Task::App(AppTimer::ResizeDebounce) => {
                if self.timers.settle(AppTimer::ResizeDebounce, id) {
                    let width = self.pending_width;
                    self.fan_out(&PageEvent::ResizeSettled { width });
                }
            }
            other => match self.widgets.timer_owner(other) {
                Some(ctrl) => {
                    if let Err(err) = ctrl.on_timer(&mut self.env, id, other) {
                        log::error!("{}: timer handler failed: {err}", ctrl.name());
                    }
                }
                None => log::debug!("app: no owner for {other:?}"),
            },
        }
    }

    fn report_visibility(&mut self, target: NodeId, ratio: f64) {
        for signal in self.env.visibility.report(target, ratio) {
            let Some(ctrl) = self.widgets.observer_owner(signal.owner) else {
                continue;
            };
            if let Err(err) = ctrl.on_visibility(&mut self.env, &signal) {
                log::error!("{}: visibility handler failed: {err}", ctrl.name());
            }
        }
    }

    fn drain_effects(&mut self) {
        loop {
            let effects = self.env.take_effects();
            if effects.is_empty() {
                return;
            }
            for effect in effects {
                match effect {
                    Effect::Broadcast(broadcast) => {
                        log::debug!("app: broadcast {}", broadcast.event_name());
                        for listener in &mut self.listeners {
                            listener(&broadcast);
                        }
                    }
                    Effect::ShowButtonLoading { button, label } => self.show_button_loading(button, label.as_deref()),
                    Effect::HideButtonLoading { button } => self.hide_button_loading(button),
                }
            }
        }
    }

    fn save_snapshot(&mut self) {
        let key = self.env.config.snapshot_storage_key.clone();
        let snapshot = self.state();
        self.env.store.save_json(&key, &snapshot);
        log::debug!("app: state snapshot saved under {key}");
    }
}
