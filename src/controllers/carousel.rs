//! Carousel: current slide, dot indicators, and autoplay.
//!
//! DESIGN
//! ======
//! Phases are `Idle`, `Autoplaying` and `Paused`, all carrying the current
//! index. The autoplay timer lives in a [`TimerSlots`] slot, so every start is
//! a stop-then-start and there is never more than one. Manual navigation
//! (dots, prev/next buttons, keyboard) stops autoplay, moves, and arms a
//! grace timer that resumes autoplay later.
//!
//! Every automatic re-arm path (pointer leave, focus leave, grace expiry,
//! page visible again) goes through [`CarouselController::resume`], which
//! refuses while the carousel is out of view, the page is hidden, the pointer
//! or focus is inside, or motion is disabled. Only an explicit
//! [`CarouselController::start_autoplay`] bypasses those checks.

#[cfg(test)]
#[path = "carousel_test.rs"]
mod carousel_test;

use crate::controller::Controller;
use crate::controllers::reflect_or_restore;
use crate::dom::{Dom, NodeId};
use crate::env::Env;
use crate::error::{DomError, WidgetError};
use crate::event::{Key, PageEvent};
use crate::selectors::{ACTIVE_CLASS, CAROUSEL, CAROUSEL_DOT, CAROUSEL_NEXT, CAROUSEL_PREV, CAROUSEL_SLIDE};
use crate::state::StateHandle;
use crate::timer::{Task, TimerId, TimerSlots};
use crate::visibility::{ObserveMode, Observer, VisibilitySignal};

const NAME: &str = "carousel";
const DEFAULT_LABEL: &str = "Slide";

/// Timer purposes owned by the carousel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CarouselTimer {
    /// Repeating advance to the next slide.
    Autoplay,
    /// One-shot resume after manual navigation.
    GraceResume,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarouselPhase {
    Idle(usize),
    Autoplaying(usize),
    Paused(usize),
}

#[derive(Debug, Clone)]
struct Anchors {
    root: NodeId,
    slides: Vec<NodeId>,
    dots: Vec<NodeId>,
    prev: Option<NodeId>,
    next: Option<NodeId>,
    label: String,
}

impl Anchors {
    fn reflect(&self, dom: &mut dyn Dom, index: usize) -> Result<(), DomError> {
        for (i, slide) in self.slides.iter().enumerate() {
            let on = i == index;
            dom.toggle_class(*slide, ACTIVE_CLASS, on)?;
            dom.set_flag(*slide, "aria-hidden", !on)?;
        }
        for (i, dot) in self.dots.iter().enumerate() {
            let on = i == index;
            dom.toggle_class(*dot, ACTIVE_CLASS, on)?;
            dom.set_flag(*dot, "aria-selected", on)?;
            if on {
                dom.set_attribute(*dot, "aria-current", "true")?;
            } else {
                dom.remove_attribute(*dot, "aria-current")?;
            }
        }
        Ok(())
    }

    fn describe(&self, dom: &dyn Dom, index: usize) -> String {
        let mut message = format!("{} {} of {}", self.label, index + 1, self.slides.len());
        if let Some(author) = self.slides.get(index).and_then(|s| dom.attribute(*s, "data-author")) {
            let author = author.trim();
            if !author.is_empty() {
                message.push_str(", by ");
                message.push_str(author);
            }
        }
        message
    }
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug)]
pub struct CarouselController {
    anchors: Option<Anchors>,
    state: StateHandle,
    index: usize,
    slots: TimerSlots<CarouselTimer>,
    /// `data-autoplay="false"` on the root turns automatic playback off.
    autoplay_enabled: bool,
    in_view: bool,
    page_hidden: bool,
    hovered: bool,
    focused: bool,
    resume_when_visible: bool,
}

impl CarouselController {
    /// Locate the carousel and reflect its initial slide.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::Markup`] when the dot count differs from the
    /// slide count, or a DOM error if the initial reflection fails.
    pub fn new(env: &mut Env, state: StateHandle) -> Result<Self, WidgetError> {
        let mut this = Self {
            anchors: None,
            state,
            index: 0,
            slots: TimerSlots::new(),
            autoplay_enabled: false,
            in_view: false,
            page_hidden: false,
            hovered: false,
            focused: false,
            resume_when_visible: false,
        };

        let dom = env.dom.as_ref();
        let Some(root) = dom.query(dom.body(), &CAROUSEL) else {
            log::debug!("{NAME}: no root anchor, inert");
            return Ok(this);
        };
        let slides = dom.query_all(root, &CAROUSEL_SLIDE);
        if slides.is_empty() {
            log::debug!("{NAME}: no slides, inert");
            return Ok(this);
        }
        let dots = dom.query_all(root, &CAROUSEL_DOT);
        if !dots.is_empty() && dots.len() != slides.len() {
            return Err(WidgetError::markup(NAME, format!("{} dots for {} slides", dots.len(), slides.len())));
        }
        let label = dom
            .attribute(root, "data-label")
            .map(|l| l.trim().to_owned())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| DEFAULT_LABEL.to_owned());
        let anchors = Anchors {
            root,
            prev: dom.query(root, &CAROUSEL_PREV),
            next: dom.query(root, &CAROUSEL_NEXT),
            label,
            slides,
            dots,
        };
        let initial = anchors.slides.iter().position(|s| dom.has_class(*s, ACTIVE_CLASS)).unwrap_or(0);
        this.autoplay_enabled = dom.attribute(root, "data-autoplay").is_none_or(|v| v != "false");

        anchors.reflect(env.dom.as_mut(), initial)?;
        this.index = initial;
        this.state.borrow_mut().current_index = initial;
        env.visibility.observe(root, Observer::Carousel, ObserveMode::Continuous, env.config.carousel_visible_ratio);
        this.anchors = Some(anchors);
        Ok(this)
    }

    // =========================================================================
    // NAVIGATION
    // =========================================================================

    /// Show slide `index`. Out-of-range indices are ignored.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the DOM reflection failed; the previous slide stays
    /// active and `SharedState.current_index` is unchanged.
    pub fn go_to(&mut self, env: &mut Env, index: usize) -> Result<(), WidgetError> {
        let Some(anchors) = &self.anchors else {
            return Ok(());
        };
        if index >= anchors.slides.len() {
            return Ok(());
        }
        reflect_or_restore(env.dom.as_mut(), NAME, index, self.index, |dom, i| anchors.reflect(dom, i))?;
        self.index = index;
        self.state.borrow_mut().current_index = index;
        let message = anchors.describe(env.dom.as_ref(), index);
        env.announce(message);
        Ok(())
    }

    /// # Errors
    ///
    /// See [`CarouselController::go_to`].
    pub fn next(&mut self, env: &mut Env) -> Result<(), WidgetError> {
        let count = self.slide_count();
        if count == 0 {
            return Ok(());
        }
        self.go_to(env, (self.index + 1) % count)
    }

    /// # Errors
    ///
    /// See [`CarouselController::go_to`].
    pub fn prev(&mut self, env: &mut Env) -> Result<(), WidgetError> {
        let count = self.slide_count();
        if count == 0 {
            return Ok(());
        }
        self.go_to(env, (self.index + count - 1) % count)
    }

    /// User-driven move: stop autoplay, navigate, resume after the grace delay.
    fn navigate_manually(&mut self, env: &mut Env, index: usize) -> Result<(), WidgetError> {
        self.stop_autoplay(env);
        let result = self.go_to(env, index);
        if self.autoplay_enabled {
            self.slots.arm(
                &mut env.timers,
                CarouselTimer::GraceResume,
                env.config.autoplay_grace_ms,
                Task::Carousel(CarouselTimer::GraceResume),
            );
        }
        result
    }

    // =========================================================================
    // AUTOPLAY
    // =========================================================================

    /// Start (or restart) autoplay unconditionally.
    pub fn start_autoplay(&mut self, env: &mut Env) {
        if self.anchors.is_none() {
            return;
        }
        self.slots.disarm(&mut env.timers, CarouselTimer::GraceResume);
        self.slots.arm_repeating(
            &mut env.timers,
            CarouselTimer::Autoplay,
            env.config.autoplay_ms,
            Task::Carousel(CarouselTimer::Autoplay),
        );
    }

    /// Cancel autoplay and any pending grace resume.
    pub fn stop_autoplay(&mut self, env: &mut Env) {
        self.slots.disarm(&mut env.timers, CarouselTimer::Autoplay);
        self.slots.disarm(&mut env.timers, CarouselTimer::GraceResume);
    }

    /// Start autoplay if nothing currently holds it back.
    pub fn resume(&mut self, env: &mut Env) {
        if self.can_autoplay() {
            self.start_autoplay(env);
        }
    }

    fn can_autoplay(&self) -> bool {
        self.anchors.is_some()
            && self.autoplay_enabled
            && self.in_view
            && !self.page_hidden
            && !self.hovered
            && !self.focused
            && self.state.borrow().motion_enabled
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn slide_count(&self) -> usize {
        self.anchors.as_ref().map_or(0, |a| a.slides.len())
    }

    #[must_use]
    pub fn is_autoplaying(&self) -> bool {
        self.slots.is_armed(CarouselTimer::Autoplay)
    }

    #[must_use]
    pub fn phase(&self) -> CarouselPhase {
        if self.is_autoplaying() {
            CarouselPhase::Autoplaying(self.index)
        } else if self.page_hidden || self.hovered || self.focused || self.slots.is_armed(CarouselTimer::GraceResume) {
            CarouselPhase::Paused(self.index)
        } else {
            CarouselPhase::Idle(self.index)
        }
    }

    fn root(&self) -> Option<NodeId> {
        self.anchors.as_ref().map(|a| a.root)
    }

    fn click_target(&self, dom: &dyn Dom, target: NodeId) -> Option<usize> {
        let anchors = self.anchors.as_ref()?;
        if let Some(i) = anchors.dots.iter().position(|d| dom.contains(*d, target)) {
            return Some(i);
        }
        let count = anchors.slides.len();
        if anchors.prev.is_some_and(|p| dom.contains(p, target)) {
            return Some((self.index + count - 1) % count);
        }
        if anchors.next.is_some_and(|n| dom.contains(n, target)) {
            return Some((self.index + 1) % count);
        }
        None
    }
}

impl Controller for CarouselController {
    fn name(&self) -> &'static str {
        NAME
    }

    fn is_inert(&self) -> bool {
        self.anchors.is_none()
    }

    fn handle_event(&mut self, env: &mut Env, event: &PageEvent) -> Result<bool, WidgetError> {
        let Some(root) = self.root() else {
            return Ok(false);
        };
        match *event {
            PageEvent::Click { target } if env.dom.contains(root, target) => {
                if let Some(index) = self.click_target(env.dom.as_ref(), target) {
                    self.navigate_manually(env, index)?;
                }
                Ok(false)
            }
            PageEvent::KeyDown { target, key, .. } if env.dom.contains(root, target) => {
                let count = self.slide_count();
                let index = match key {
                    Key::ArrowLeft => (self.index + count - 1) % count,
                    Key::ArrowRight => (self.index + 1) % count,
                    Key::Home => 0,
                    Key::End => count - 1,
                    _ => return Ok(false),
                };
                self.navigate_manually(env, index)?;
                Ok(true)
            }
            PageEvent::PointerEnter { target } if target == root => {
                self.hovered = true;
                self.stop_autoplay(env);
                Ok(false)
            }
            PageEvent::PointerLeave { target } if target == root => {
                self.hovered = false;
                self.resume(env);
                Ok(false)
            }
            PageEvent::FocusIn { target } if env.dom.contains(root, target) => {
                if !self.focused {
                    self.focused = true;
                    self.stop_autoplay(env);
                }
                Ok(false)
            }
            PageEvent::FocusOut { target, related } if env.dom.contains(root, target) => {
                if related.is_some_and(|r| env.dom.contains(root, r)) {
                    return Ok(false);
                }
                self.focused = false;
                self.resume(env);
                Ok(false)
            }
            PageEvent::VisibilityChange { hidden: true } => {
                self.resume_when_visible = self.is_autoplaying() || self.slots.is_armed(CarouselTimer::GraceResume);
                self.page_hidden = true;
                self.stop_autoplay(env);
                Ok(false)
            }
            PageEvent::VisibilityChange { hidden: false } => {
                self.page_hidden = false;
                if std::mem::take(&mut self.resume_when_visible) {
                    self.resume(env);
                }
                Ok(false)
            }
            PageEvent::MotionPreferenceChange { reduced } => {
                if reduced {
                    self.stop_autoplay(env);
                } else {
                    self.resume(env);
                }
                Ok(false)
            }
            _ => Ok(false),
        }
    }

    fn on_timer(&mut self, env: &mut Env, id: TimerId, task: Task) -> Result<(), WidgetError> {
        let Task::Carousel(kind) = task else {
            return Ok(());
        };
        let Some(root) = self.root() else {
            return Ok(());
        };
        match kind {
            CarouselTimer::Autoplay => {
                if !self.slots.owns(kind, id) {
                    return Ok(());
                }
                if !env.dom.is_attached(root) {
                    log::debug!("{NAME}: root detached, autoplay stopped");
                    self.stop_autoplay(env);
                    return Ok(());
                }
                self.next(env)
            }
            CarouselTimer::GraceResume => {
                if self.slots.settle(kind, id) && env.dom.is_attached(root) {
                    self.resume(env);
                }
                Ok(())
            }
        }
    }

    fn on_visibility(&mut self, env: &mut Env, signal: &VisibilitySignal) -> Result<(), WidgetError> {
        if signal.owner != Observer::Carousel {
            return Ok(());
        }
        self.in_view = signal.visible;
        if signal.visible {
            self.resume(env);
        } else {
            self.stop_autoplay(env);
        }
        Ok(())
    }

    fn teardown(&mut self, env: &mut Env) {
        self.slots.disarm_all(&mut env.timers);
        env.visibility.unobserve_owner(Observer::Carousel);
    }
}
