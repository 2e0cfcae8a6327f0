//! Progress bars and count-up counters.
//!
//! A progress element is `.progress[data-value]`; its stored value is the
//! `data-value` attribute and its displayed value is `aria-valuenow`. The
//! fill (`.progress-bar`) width and optional `.progress-text` follow the
//! displayed value. Bars animate from 0 to their declared value the first
//! time they scroll into view; `.counter[data-target]` elements count up the
//! same way. With motion disabled every change applies immediately.
//!
//! Animation runs as a repeating frame timer per element, sampled against
//! the virtual clock.

#[cfg(test)]
#[path = "progress_test.rs"]
mod progress_test;

use std::collections::HashMap;

use crate::controller::Controller;
use crate::dom::{Dom, NodeId};
use crate::env::Env;
use crate::error::{DomError, WidgetError};
use crate::event::PageEvent;
use crate::selectors::{COUNTER, PROGRESS, PROGRESS_FILL, PROGRESS_TEXT};
use crate::state::StateHandle;
use crate::timer::{Task, TimerId, TimerSlots};
use crate::visibility::{ObserveMode, Observer, VisibilitySignal};

const NAME: &str = "progress";

/// `1 - (1 - t)^3`, with `t` clamped to `[0, 1]`.
#[must_use]
pub fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t.clamp(0.0, 1.0)).powi(3)
}

/// Clamp to `[0, 100]`; NaN becomes 0.
#[must_use]
pub fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 100.0) }
}

fn format_number(value: f64) -> String {
    if value.fract().abs() < f64::EPSILON { format!("{value:.0}") } else { format!("{value}") }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Tween {
    from: f64,
    to: f64,
    started_ms: u64,
    duration_ms: u64,
}

impl Tween {
    /// Value at `now`, and whether the tween has finished.
    #[allow(clippy::cast_precision_loss)]
    fn sample(&self, now: u64) -> (f64, bool) {
        let elapsed = now.saturating_sub(self.started_ms);
        if elapsed >= self.duration_ms {
            return (self.to, true);
        }
        let t = elapsed as f64 / self.duration_ms as f64;
        (self.from + (self.to - self.from) * ease_out_cubic(t), false)
    }
}

#[derive(Debug, Clone, Copy)]
struct Bar {
    root: NodeId,
    fill: Option<NodeId>,
    text: Option<NodeId>,
}

impl Bar {
    fn render(&self, dom: &mut dyn Dom, value: f64) -> Result<(), DomError> {
        let shown = value.round();
        dom.set_attribute(self.root, "aria-valuenow", &format_number(shown))?;
        if let Some(fill) = self.fill {
            dom.set_style(fill, "width", &format!("{}%", format_number(value)))?;
        }
        if let Some(text) = self.text {
            dom.set_text(text, &format!("{}%", format_number(shown)))?;
        }
        Ok(())
    }
}

fn render_counter(dom: &mut dyn Dom, node: NodeId, value: f64, done: bool) -> Result<(), DomError> {
    let shown = if done { value } else { value.round() };
    dom.set_text(node, &format_number(shown))
}

#[derive(Debug)]
pub struct ProgressController {
    bars: Vec<Bar>,
    counters: Vec<NodeId>,
    tweens: HashMap<NodeId, Tween>,
    frames: TimerSlots<NodeId>,
    state: StateHandle,
}

impl ProgressController {
    /// Find bars and counters. With motion enabled they are zeroed and wait
    /// for their first visibility; otherwise they show their final values.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the initial rendering fails.
    pub fn new(env: &mut Env, state: StateHandle) -> Result<Self, WidgetError> {
        let dom = env.dom.as_ref();
        let body = dom.body();
        let bars: Vec<Bar> = dom
            .query_all(body, &PROGRESS)
            .into_iter()
            .map(|root| Bar { root, fill: dom.query(root, &PROGRESS_FILL), text: dom.query(root, &PROGRESS_TEXT) })
            .collect();
        let counters = dom.query_all(body, &COUNTER);
        let this = Self { bars, counters, tweens: HashMap::new(), frames: TimerSlots::new(), state };
        if this.is_inert() {
            log::debug!("{NAME}: no progress bars or counters, inert");
            return Ok(this);
        }

        let motion = this.motion();
        for bar in &this.bars {
            let declared = clamp_percent(env.dom.number_attribute(bar.root, "data-value").unwrap_or(0.0));
            if motion {
                bar.render(env.dom.as_mut(), 0.0)?;
                env.visibility.observe(bar.root, Observer::Progress, ObserveMode::OneShot, env.config.reveal_ratio);
            } else {
                bar.render(env.dom.as_mut(), declared)?;
            }
        }
        for counter in &this.counters {
            if motion {
                render_counter(env.dom.as_mut(), *counter, 0.0, false)?;
                env.visibility.observe(*counter, Observer::Counter, ObserveMode::OneShot, env.config.reveal_ratio);
            } else {
                let target = env.dom.number_attribute(*counter, "data-target").unwrap_or(0.0);
                render_counter(env.dom.as_mut(), *counter, target, true)?;
            }
        }
        Ok(this)
    }

    /// Stored value of a tracked bar.
    #[must_use]
    pub fn value(&self, env: &Env, target: NodeId) -> Option<f64> {
        self.bar(target)?;
        env.dom.number_attribute(target, "data-value")
    }

    /// Whether a frame timer is animating `target`.
    #[must_use]
    pub fn is_animating(&self, target: NodeId) -> bool {
        self.frames.is_armed(target)
    }

    /// Store `value` (clamped to `[0, 100]`) on `target` and show it,
    /// animated from the displayed value when `animate` is set and motion is
    /// enabled. Untracked targets are ignored.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a DOM write failed.
    pub fn set_progress(&mut self, env: &mut Env, target: NodeId, value: f64, animate: bool) -> Result<(), WidgetError> {
        let Some(bar) = self.bar(target) else {
            log::debug!("{NAME}: {target:?} is not a tracked progress element");
            return Ok(());
        };
        let value = clamp_percent(value);
        env.dom.set_attribute(target, "data-value", &format_number(value))?;
        if animate && self.motion() {
            let from = env.dom.number_attribute(target, "aria-valuenow").unwrap_or(0.0);
            let duration = env.config.progress_ms;
            self.start(env, target, Task::Progress(target), from, value, duration);
        } else {
            self.stop(env, target);
            bar.render(env.dom.as_mut(), value)?;
        }
        Ok(())
    }

    /// Add `amount` to the stored value and animate to the result.
    ///
    /// # Errors
    ///
    /// See [`ProgressController::set_progress`].
    pub fn increment(&mut self, env: &mut Env, target: NodeId, amount: f64) -> Result<(), WidgetError> {
        let current = env.dom.number_attribute(target, "data-value").unwrap_or(0.0);
        self.set_progress(env, target, current + amount, true)
    }

    fn bar(&self, node: NodeId) -> Option<Bar> {
        self.bars.iter().copied().find(|b| b.root == node)
    }

    fn motion(&self) -> bool {
        self.state.borrow().motion_enabled
    }

    fn start(&mut self, env: &mut Env, node: NodeId, task: Task, from: f64, to: f64, duration_ms: u64) {
        self.tweens.insert(node, Tween { from, to, started_ms: env.timers.now_ms(), duration_ms });
        self.frames.arm_repeating(&mut env.timers, node, env.config.frame_ms, task);
    }

    fn stop(&mut self, env: &mut Env, node: NodeId) {
        self.frames.disarm(&mut env.timers, node);
        self.tweens.remove(&node);
    }

    fn frame(&mut self, env: &mut Env, node: NodeId, counter: bool) -> Result<(), WidgetError> {
        if !env.dom.is_attached(node) {
            self.stop(env, node);
            return Ok(());
        }
        let Some(tween) = self.tweens.get(&node).copied() else {
            self.stop(env, node);
            return Ok(());
        };
        let (value, done) = tween.sample(env.timers.now_ms());
        if done {
            self.stop(env, node);
        }
        if counter {
            render_counter(env.dom.as_mut(), node, value, done)?;
        } else if let Some(bar) = self.bar(node) {
            bar.render(env.dom.as_mut(), value)?;
        }
        Ok(())
    }
}

impl Controller for ProgressController {
    fn name(&self) -> &'static str {
        NAME
    }

    fn is_inert(&self) -> bool {
        self.bars.is_empty() && self.counters.is_empty()
    }

    fn handle_event(&mut self, _env: &mut Env, _event: &PageEvent) -> Result<bool, WidgetError> {
        Ok(false)
    }

    fn on_timer(&mut self, env: &mut Env, id: TimerId, task: Task) -> Result<(), WidgetError> {
        let (node, counter) = match task {
            Task::Progress(node) => (node, false),
            Task::Counter(node) => (node, true),
            _ => return Ok(()),
        };
        if !self.frames.owns(node, id) {
            return Ok(());
        }
        self.frame(env, node, counter)
    }

    fn on_visibility(&mut self, env: &mut Env, signal: &VisibilitySignal) -> Result<(), WidgetError> {
        if !signal.visible || !env.dom.is_attached(signal.node) {
            return Ok(());
        }
        let node = signal.node;
        match signal.owner {
            Observer::Progress if self.bar(node).is_some() => {
                let declared = clamp_percent(env.dom.number_attribute(node, "data-value").unwrap_or(0.0));
                let duration = env.config.progress_ms;
                self.start(env, node, Task::Progress(node), 0.0, declared, duration);
            }
            Observer::Counter if self.counters.contains(&node) => {
                let target = env.dom.number_attribute(node, "data-target").unwrap_or(0.0);
                let duration = env.config.counter_ms;
                self.start(env, node, Task::Counter(node), 0.0, target, duration);
            }
            _ => {}
        }
        Ok(())
    }

    fn teardown(&mut self, env: &mut Env) {
        self.frames.disarm_all(&mut env.timers);
        self.tweens.clear();
        env.visibility.unobserve_owner(Observer::Progress);
        env.visibility.unobserve_owner(Observer::Counter);
    }
}
