//! Navigation controller: mobile menu open state, header hide-on-scroll, and
//! scroll-spy over in-page section links.
//!
//! `open` is the only state this controller writes to `SharedState`. The
//! header's hidden flag is a separate presentational concern driven by
//! throttled scroll direction and never touches `open`.

#[cfg(test)]
#[path = "nav_test.rs"]
mod nav_test;

use crate::controller::Controller;
use crate::controllers::reflect_or_restore;
use crate::dom::{Dom, NodeId};
use crate::env::Env;
use crate::error::{DomError, WidgetError};
use crate::event::{Key, PageEvent};
use crate::selectors::{
    ACTIVE_CLASS, HEADER_HIDDEN_CLASS, NAV_HEADER, NAV_LINK, NAV_MENU, NAV_OPEN_BODY_CLASS, NAV_OPEN_CLASS, NAV_TOGGLE,
};
use crate::state::StateHandle;
use crate::timer::{Task, TimerId, TimerSlots};
use crate::visibility::{ObserveMode, Observer, VisibilitySignal};

const NAME: &str = "nav";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavTimer {
    /// End of the scroll throttle window.
    ScrollThrottle,
}

#[derive(Debug, Clone)]
struct Anchors {
    menu: NodeId,
    toggle: Option<NodeId>,
    links: Vec<NodeId>,
    header: Option<NodeId>,
    /// `(section, link)` pairs for links of the form `href="#id"`.
    sections: Vec<(NodeId, NodeId)>,
}

impl Anchors {
    fn reflect(&self, dom: &mut dyn Dom, open: bool) -> Result<(), DomError> {
        if let Some(toggle) = self.toggle {
            dom.set_flag(toggle, "aria-expanded", open)?;
            dom.set_attribute(toggle, "aria-label", if open { "Close menu" } else { "Open menu" })?;
        }
        dom.toggle_class(self.menu, NAV_OPEN_CLASS, open)?;
        let body = dom.body();
        dom.toggle_class(body, NAV_OPEN_BODY_CLASS, open)?;
        Ok(())
    }

    fn mark_current(&self, dom: &mut dyn Dom, current: NodeId) -> Result<(), DomError> {
        for link in &self.links {
            let on = *link == current;
            dom.toggle_class(*link, ACTIVE_CLASS, on)?;
            if on {
                dom.set_attribute(*link, "aria-current", "true")?;
            } else {
                dom.remove_attribute(*link, "aria-current")?;
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct NavController {
    anchors: Option<Anchors>,
    state: StateHandle,
    slots: TimerSlots<NavTimer>,
    last_scroll_y: f64,
    /// Latest position seen while the throttle window was closed.
    pending_scroll_y: Option<f64>,
    header_hidden: bool,
}

impl NavController {
    /// Locate the menu, its toggle, the header, and scroll-spy sections.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the initial closed-state reflection fails.
    pub fn new(env: &mut Env, state: StateHandle) -> Result<Self, WidgetError> {
        let mut this =
            Self { anchors: None, state, slots: TimerSlots::new(), last_scroll_y: 0.0, pending_scroll_y: None, header_hidden: false };
        let dom = env.dom.as_ref();
        let body = dom.body();
        let Some(menu) = dom.query(body, &NAV_MENU) else {
            log::debug!("{NAME}: no menu anchor, inert");
            return Ok(this);
        };
        let links = dom.query_all(body, &NAV_LINK);
        let sections = links
            .iter()
            .filter_map(|link| {
                let href = dom.attribute(*link, "href")?;
                let id = href.strip_prefix('#').filter(|id| !id.is_empty())?;
                dom.get_by_id(id).map(|section| (section, *link))
            })
            .collect();
        let anchors = Anchors { menu, toggle: dom.query(body, &NAV_TOGGLE), header: dom.query(body, &NAV_HEADER), links, sections };

        anchors.reflect(env.dom.as_mut(), false)?;
        this.state.borrow_mut().nav_open = false;
        for (section, _) in &anchors.sections {
            env.visibility.observe(*section, Observer::ScrollSpy, ObserveMode::Continuous, env.config.scroll_spy_ratio);
        }
        this.anchors = Some(anchors);
        Ok(this)
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state.borrow().nav_open
    }

    #[must_use]
    pub fn header_hidden(&self) -> bool {
        self.header_hidden
    }

    /// # Errors
    ///
    /// Returns `Err` if reflection failed; the previous state is restored.
    pub fn toggle(&mut self, env: &mut Env) -> Result<(), WidgetError> {
        let open = !self.is_open();
        self.set_open(env, open)
    }

    /// # Errors
    ///
    /// See [`NavController::toggle`].
    pub fn close(&mut self, env: &mut Env) -> Result<(), WidgetError> {
        if self.is_open() { self.set_open(env, false) } else { Ok(()) }
    }

    fn set_open(&mut self, env: &mut Env, open: bool) -> Result<(), WidgetError> {
        let Some(anchors) = &self.anchors else {
            return Ok(());
        };
        let previous = self.is_open();
        reflect_or_restore(env.dom.as_mut(), NAME, open, previous, |dom, o| anchors.reflect(dom, o))?;
        self.state.borrow_mut().nav_open = open;
        env.announce(if open { "Navigation menu opened" } else { "Navigation menu closed" });
        Ok(())
    }

    // =========================================================================
    // SCROLL
    // =========================================================================

    fn on_scroll(&mut self, env: &mut Env, y: f64) -> Result<(), WidgetError> {
        if self.slots.is_armed(NavTimer::ScrollThrottle) {
            self.pending_scroll_y = Some(y);
            return Ok(());
        }
        self.track_scroll(env, y)?;
        self.slots.arm(&mut env.timers, NavTimer::ScrollThrottle, env.config.scroll_throttle_ms, Task::Nav(NavTimer::ScrollThrottle));
        Ok(())
    }

    fn track_scroll(&mut self, env: &mut Env, y: f64) -> Result<(), WidgetError> {
        let hidden = if y > self.last_scroll_y && y > env.config.header_hide_offset_px {
            true
        } else if y < self.last_scroll_y {
            false
        } else {
            self.header_hidden
        };
        self.last_scroll_y = y;
        let Some(header) = self.anchors.as_ref().and_then(|a| a.header) else {
            return Ok(());
        };
        if hidden != self.header_hidden {
            env.dom.toggle_class(header, HEADER_HIDDEN_CLASS, hidden)?;
            self.header_hidden = hidden;
        }
        Ok(())
    }

    fn is_outside(&self, dom: &dyn Dom, target: NodeId) -> bool {
        self.anchors
            .as_ref()
            .is_some_and(|a| !dom.contains(a.menu, target) && !a.toggle.is_some_and(|t| dom.contains(t, target)))
    }
}

impl Controller for NavController {
    fn name(&self) -> &'static str {
        NAME
    }

    fn is_inert(&self) -> bool {
        self.anchors.is_none()
    }

    fn handle_event(&mut self, env: &mut Env, event: &PageEvent) -> Result<bool, WidgetError> {
        let Some(anchors) = &self.anchors else {
            return Ok(false);
        };
        match *event {
            PageEvent::Click { target } => {
                let dom = env.dom.as_ref();
                if anchors.toggle.is_some_and(|t| dom.contains(t, target)) {
                    self.toggle(env)?;
                    return Ok(false);
                }
                let link = anchors.links.iter().copied().find(|l| dom.contains(*l, target));
                if let Some(link) = link {
                    let in_menu = dom.contains(anchors.menu, link);
                    anchors.mark_current(env.dom.as_mut(), link)?;
                    if in_menu {
                        self.close(env)?;
                    }
                    return Ok(false);
                }
                if self.is_open() && self.is_outside(env.dom.as_ref(), target) {
                    self.close(env)?;
                }
                Ok(false)
            }
            PageEvent::KeyDown { key: Key::Escape, .. } if self.is_open() => {
                let toggle = anchors.toggle;
                self.close(env)?;
                if let Some(toggle) = toggle {
                    env.dom.focus(toggle)?;
                }
                Ok(false)
            }
            PageEvent::ResizeSettled { width } if self.is_open() && width >= env.config.nav_breakpoint_px => {
                self.close(env)?;
                Ok(false)
            }
            PageEvent::Scroll { y } => {
                self.on_scroll(env, y)?;
                Ok(false)
            }
            _ => Ok(false),
        }
    }

    fn on_timer(&mut self, env: &mut Env, id: TimerId, task: Task) -> Result<(), WidgetError> {
        let Task::Nav(kind) = task else {
            return Ok(());
        };
        if !self.slots.settle(kind, id) {
            return Ok(());
        }
        if let Some(y) = self.pending_scroll_y.take() {
            self.on_scroll(env, y)?;
        }
        Ok(())
    }

    fn on_visibility(&mut self, env: &mut Env, signal: &VisibilitySignal) -> Result<(), WidgetError> {
        if signal.owner != Observer::ScrollSpy || !signal.visible {
            return Ok(());
        }
        let Some(anchors) = &self.anchors else {
            return Ok(());
        };
        let Some(link) = anchors.sections.iter().find(|(s, _)| *s == signal.node).map(|(_, l)| *l) else {
            return Ok(());
        };
        if !env.dom.is_attached(link) {
            return Ok(());
        }
        anchors.mark_current(env.dom.as_mut(), link)?;
        Ok(())
    }

    fn teardown(&mut self, env: &mut Env) {
        self.slots.disarm_all(&mut env.timers);
        env.visibility.unobserve_owner(Observer::ScrollSpy);
    }
}
