//! Animation showcase: replay one card's demo animation, play every card in
//! a stagger, and switch the demo speed.
//!
//! A card's `data-animation` names the class (`animate-<name>`) put on its
//! `.animation-box`. Playing strips and re-adds the class so the animation
//! restarts, then a per-card timer strips it again once the animation has
//! run at the current speed.

#[cfg(test)]
#[path = "animation_test.rs"]
mod animation_test;

use crate::controller::Controller;
use crate::dom::{Dom, NodeId};
use crate::env::Env;
use crate::error::WidgetError;
use crate::event::PageEvent;
use crate::selectors::{ANIMATION_BOX, ANIMATION_CARD, ANIMATION_PLAY, ANIMATION_SPEED, DURATION_PROPERTIES};
use crate::timer::{Task, TimerId, TimerSlots};

const NAME: &str = "animation";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationTimer {
    /// A card's turn during play-all.
    Start(NodeId),
    /// Strip the animation class after it has run.
    Finish(NodeId),
}

/// Demo playback speed, as offered by the speed control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Speed {
    Fast,
    #[default]
    Normal,
    Slow,
    Slower,
}

impl Speed {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "fast" => Some(Self::Fast),
            "normal" => Some(Self::Normal),
            "slow" => Some(Self::Slow),
            "slower" => Some(Self::Slower),
            _ => None,
        }
    }

    #[must_use]
    pub fn duration_ms(self) -> u64 {
        match self {
            Self::Fast => 150,
            Self::Normal => 300,
            Self::Slow => 500,
            Self::Slower => 1_000,
        }
    }
}

#[derive(Debug)]
pub struct AnimationController {
    cards: Vec<NodeId>,
    play_all: Option<NodeId>,
    speed_control: Option<NodeId>,
    speed: Speed,
    slots: TimerSlots<AnimationTimer>,
}

impl AnimationController {
    #[must_use]
    pub fn new(env: &Env) -> Self {
        let dom = env.dom.as_ref();
        let body = dom.body();
        let cards = dom.query_all(body, &ANIMATION_CARD);
        let speed_control = dom.query(body, &ANIMATION_SPEED);
        let speed = speed_control.and_then(|s| Speed::from_name(&dom.value(s))).unwrap_or_default();
        if cards.is_empty() && speed_control.is_none() {
            log::debug!("{NAME}: no showcase, inert");
        }
        Self { cards, play_all: dom.query(body, &ANIMATION_PLAY), speed_control, speed, slots: TimerSlots::new() }
    }

    #[must_use]
    pub fn speed(&self) -> Speed {
        self.speed
    }

    /// Restart the demo animation of `card`. Cards without a box or an
    /// animation name are ignored.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the class could not be written.
    pub fn play(&mut self, env: &mut Env, card: NodeId) -> Result<(), WidgetError> {
        let Some((target, class)) = animation_target(env.dom.as_ref(), card) else {
            return Ok(());
        };
        let dom = env.dom.as_mut();
        dom.toggle_class(target, &class, false)?;
        dom.reflow(target);
        dom.toggle_class(target, &class, true)?;
        let finish = AnimationTimer::Finish(card);
        self.slots.arm(&mut env.timers, finish, self.speed.duration_ms(), Task::Animation(finish));
        Ok(())
    }

    /// Play every card in document order, one stagger step apart. Pressing
    /// again restarts the sequence.
    pub fn play_all(&mut self, env: &mut Env) {
        let step = env.config.animation_stagger_ms;
        for (i, card) in self.cards.iter().enumerate() {
            let start = AnimationTimer::Start(*card);
            let delay = step.saturating_mul(u64::try_from(i).unwrap_or(u64::MAX));
            self.slots.arm(&mut env.timers, start, delay, Task::Animation(start));
        }
    }

    /// Switch the demo speed and rewrite the duration custom properties.
    /// Returns `false` for an unknown speed name.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a custom property could not be written.
    pub fn set_speed(&mut self, env: &mut Env, name: &str) -> Result<bool, WidgetError> {
        let Some(speed) = Speed::from_name(name) else {
            log::debug!("{NAME}: unknown speed {name:?}");
            return Ok(false);
        };
        let root = env.dom.document_element();
        let value = format!("{}ms", speed.duration_ms());
        for property in DURATION_PROPERTIES {
            env.dom.set_style(root, property, &value)?;
        }
        self.speed = speed;
        Ok(true)
    }
}

/// The box of `card` and the class that animates it.
fn animation_target(dom: &dyn Dom, card: NodeId) -> Option<(NodeId, String)> {
    let name = dom.attribute(card, "data-animation")?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((dom.query(card, &ANIMATION_BOX)?, format!("animate-{name}")))
}

impl Controller for AnimationController {
    fn name(&self) -> &'static str {
        NAME
    }

    fn is_inert(&self) -> bool {
        self.cards.is_empty() && self.speed_control.is_none()
    }

    fn handle_event(&mut self, env: &mut Env, event: &PageEvent) -> Result<bool, WidgetError> {
        match *event {
            PageEvent::Click { target } => {
                if self.play_all.is_some_and(|p| env.dom.contains(p, target)) {
                    self.play_all(env);
                    return Ok(false);
                }
                let card = self.cards.iter().copied().find(|c| env.dom.contains(*c, target));
                if let Some(card) = card {
                    self.play(env, card)?;
                }
                Ok(false)
            }
            PageEvent::Change { target } if self.speed_control == Some(target) => {
                let name = env.dom.value(target);
                self.set_speed(env, &name)?;
                Ok(false)
            }
            _ => Ok(false),
        }
    }

    fn on_timer(&mut self, env: &mut Env, id: TimerId, task: Task) -> Result<(), WidgetError> {
        let Task::Animation(kind) = task else {
            return Ok(());
        };
        if !self.slots.settle(kind, id) {
            return Ok(());
        }
        match kind {
            AnimationTimer::Start(card) if env.dom.is_attached(card) => self.play(env, card),
            AnimationTimer::Finish(card) if env.dom.is_attached(card) => {
                if let Some((target, class)) = animation_target(env.dom.as_ref(), card) {
                    env.dom.toggle_class(target, &class, false)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn teardown(&mut self, env: &mut Env) {
        self.slots.disarm_all(&mut env.timers);
    }
}
