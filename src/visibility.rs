//! Viewport-visibility registrations.
//!
//! The host reports intersection ratios per observed element; the trigger
//! turns them into [`VisibilitySignal`]s for the registered owners. One-shot
//! registrations fire the first time the element crosses its threshold and
//! are then dropped. Continuous registrations fire on every crossing in
//! either direction.

#[cfg(test)]
#[path = "visibility_test.rs"]
mod visibility_test;

use std::collections::BTreeMap;

use crate::dom::NodeId;

/// Which component registered the observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Observer {
    Carousel,
    ScrollSpy,
    Progress,
    Counter,
    Reveal,
    Lazy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserveMode {
    /// Fire once when the element first becomes visible, then unregister.
    OneShot,
    /// Fire on every transition between visible and not visible.
    Continuous,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Registration {
    owner: Observer,
    mode: ObserveMode,
    threshold: f64,
    visible: bool,
}

/// A threshold crossing delivered to its owner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilitySignal {
    pub node: NodeId,
    pub owner: Observer,
    pub visible: bool,
    pub ratio: f64,
}

#[derive(Debug, Clone, Default)]
pub struct VisibilityTrigger {
    registrations: BTreeMap<NodeId, Vec<Registration>>,
}

impl VisibilityTrigger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `owner` for `node`. Re-registering replaces the previous entry.
    ///
    /// A `threshold` of 0 means "any intersecting pixel".
    pub fn observe(&mut self, node: NodeId, owner: Observer, mode: ObserveMode, threshold: f64) {
        let threshold = threshold.clamp(0.0, 1.0);
        let regs = self.registrations.entry(node).or_default();
        regs.retain(|r| r.owner != owner);
        regs.push(Registration { owner, mode, threshold, visible: false });
    }

    pub fn unobserve(&mut self, node: NodeId, owner: Observer) {
        if let Some(regs) = self.registrations.get_mut(&node) {
            regs.retain(|r| r.owner != owner);
            if regs.is_empty() {
                self.registrations.remove(&node);
            }
        }
    }

    /// Drop every registration held by `owner`.
    pub fn unobserve_owner(&mut self, owner: Observer) {
        for regs in self.registrations.values_mut() {
            regs.retain(|r| r.owner != owner);
        }
        self.registrations.retain(|_, regs| !regs.is_empty());
    }

    #[must_use]
    pub fn is_observed(&self, node: NodeId, owner: Observer) -> bool {
        self.registrations.get(&node).is_some_and(|regs| regs.iter().any(|r| r.owner == owner))
    }

    /// Every node with at least one registration.
    #[must_use]
    pub fn observed_nodes(&self) -> Vec<NodeId> {
        self.registrations.keys().copied().collect()
    }

    /// Distinct thresholds in use, plus 0, for configuring a host observer.
    #[must_use]
    pub fn thresholds(&self) -> Vec<f64> {
        let mut out = vec![0.0];
        for r in self.registrations.values().flatten() {
            if !out.iter().any(|t: &f64| (t - r.threshold).abs() < f64::EPSILON) {
                out.push(r.threshold);
            }
        }
        out.sort_by(f64::total_cmp);
        out
    }

    /// Feed an observed intersection ratio; returns the signals it produced.
    pub fn report(&mut self, node: NodeId, ratio: f64) -> Vec<VisibilitySignal> {
        let Some(regs) = self.registrations.get_mut(&node) else {
            return Vec::new();
        };
        let mut signals = Vec::new();
        regs.retain_mut(|reg| {
            let now_visible = if reg.threshold <= 0.0 { ratio > 0.0 } else { ratio >= reg.threshold };
            match reg.mode {
                ObserveMode::OneShot => {
                    if now_visible {
                        signals.push(VisibilitySignal { node, owner: reg.owner, visible: true, ratio });
                        return false;
                    }
                    true
                }
                ObserveMode::Continuous => {
                    if now_visible != reg.visible {
                        reg.visible = now_visible;
                        signals.push(VisibilitySignal { node, owner: reg.owner, visible: now_visible, ratio });
                    }
                    true
                }
            }
        });
        if regs.is_empty() {
            self.registrations.remove(&node);
        }
        signals
    }
}
