//! Reveal-on-scroll animations and lazy-loaded media.
//!
//! `[data-animate]` elements get `animate-in` the first time they are seen,
//! or straight away when motion is disabled. `[data-lazy]` elements swap
//! `data-src` into `src` once they come near the viewport.

#[cfg(test)]
#[path = "reveal_test.rs"]
mod reveal_test;

use crate::controller::Controller;
use crate::dom::{Dom, NodeId};
use crate::env::Env;
use crate::error::{DomError, WidgetError};
use crate::event::PageEvent;
use crate::selectors::{ANIMATE, ANIMATE_IN_CLASS, LAZY, LOADED_CLASS};
use crate::state::StateHandle;
use crate::visibility::{ObserveMode, Observer, VisibilitySignal};

const NAME: &str = "reveal";

fn load(dom: &mut dyn Dom, node: NodeId) -> Result<(), DomError> {
    if let Some(src) = dom.attribute(node, "data-src") {
        dom.set_attribute(node, "src", &src)?;
        dom.remove_attribute(node, "data-src")?;
    }
    dom.toggle_class(node, LOADED_CLASS, true)?;
    dom.remove_attribute(node, "data-lazy")
}

#[derive(Debug)]
pub struct RevealController {
    animated: Vec<NodeId>,
    lazy: Vec<NodeId>,
    state: StateHandle,
}

impl RevealController {
    /// # Errors
    ///
    /// Returns `Err` if revealing immediately (motion disabled) fails.
    pub fn new(env: &mut Env, state: StateHandle) -> Result<Self, WidgetError> {
        let dom = env.dom.as_ref();
        let body = dom.body();
        let this = Self { animated: dom.query_all(body, &ANIMATE), lazy: dom.query_all(body, &LAZY), state };
        if this.is_inert() {
            log::debug!("{NAME}: nothing to reveal or load, inert");
            return Ok(this);
        }
        if this.state.borrow().motion_enabled {
            for node in &this.animated {
                env.visibility.observe(*node, Observer::Reveal, ObserveMode::OneShot, env.config.reveal_ratio);
            }
        } else {
            this.reveal_all(env)?;
        }
        for node in &this.lazy {
            env.visibility.observe(*node, Observer::Lazy, ObserveMode::OneShot, 0.0);
        }
        Ok(this)
    }

    /// Show every pending reveal now and stop watching for them.
    fn reveal_all(&self, env: &mut Env) -> Result<(), WidgetError> {
        env.visibility.unobserve_owner(Observer::Reveal);
        for node in &self.animated {
            if env.dom.is_attached(*node) {
                env.dom.toggle_class(*node, ANIMATE_IN_CLASS, true)?;
            }
        }
        Ok(())
    }
}

impl Controller for RevealController {
    fn name(&self) -> &'static str {
        NAME
    }

    fn is_inert(&self) -> bool {
        self.animated.is_empty() && self.lazy.is_empty()
    }

    fn handle_event(&mut self, env: &mut Env, event: &PageEvent) -> Result<bool, WidgetError> {
        if let PageEvent::MotionPreferenceChange { reduced: true } = *event {
            self.reveal_all(env)?;
        }
        Ok(false)
    }

    fn on_visibility(&mut self, env: &mut Env, signal: &VisibilitySignal) -> Result<(), WidgetError> {
        if !signal.visible || !env.dom.is_attached(signal.node) {
            return Ok(());
        }
        match signal.owner {
            Observer::Reveal if self.animated.contains(&signal.node) => {
                env.dom.toggle_class(signal.node, ANIMATE_IN_CLASS, true)?;
            }
            Observer::Lazy if self.lazy.contains(&signal.node) => {
                load(env.dom.as_mut(), signal.node)?;
                log::debug!("{NAME}: loaded {:?}", signal.node);
            }
            _ => {}
        }
        Ok(())
    }

    fn teardown(&mut self, env: &mut Env) {
        env.visibility.unobserve_owner(Observer::Reveal);
        env.visibility.unobserve_owner(Observer::Lazy);
    }
}
