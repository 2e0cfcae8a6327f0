//! Virtual-clock timer queue and per-purpose timer slots.
//!
//! Every timeout, interval and animation frame in the crate is an entry in a
//! single [`TimerQueue`]. The queue never calls back into controllers; the
//! orchestrator pops due [`Task`]s one at a time and routes them to their
//! owner. In the browser the host keeps one real timeout armed for
//! [`TimerQueue::next_deadline`]; in tests the clock is advanced by hand.
//!
//! [`TimerSlots`] is the owned-timer-slot discipline: a controller keeps one
//! slot per purpose, and arming a slot always cancels whatever it held.

#[cfg(test)]
#[path = "timer_test.rs"]
mod timer_test;

use std::collections::HashMap;
use std::hash::Hash;

use crate::app::AppTimer;
use crate::controllers::animation::AnimationTimer;
use crate::controllers::carousel::CarouselTimer;
use crate::controllers::nav::NavTimer;
use crate::controllers::theme::ThemeTimer;
use crate::dom::NodeId;
use crate::toast::{ToastId, ToastStage};

/// Handle to a scheduled entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// What a due timer means, and therefore who receives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    /// Remove an announcement's live-region node.
    Announcement(NodeId),
    Toast(ToastId, ToastStage),
    Carousel(CarouselTimer),
    Theme(ThemeTimer),
    Nav(NavTimer),
    /// Animation frame for a progress element.
    Progress(NodeId),
    /// Animation frame for a numeric counter.
    Counter(NodeId),
    /// Clear the "copied" feedback on a copy affordance.
    Copy(NodeId),
    /// Complete the simulated submission of a form.
    Form(NodeId),
    Animation(AnimationTimer),
    App(AppTimer),
}

#[derive(Debug, Clone)]
struct Entry {
    id: TimerId,
    deadline: u64,
    interval: Option<u64>,
    task: Task,
}

/// Single-threaded timer queue driven by an explicit clock.
#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    now: u64,
    next_id: u64,
    entries: Vec<Entry>,
}

impl TimerQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in milliseconds.
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.now
    }

    /// Run `task` once, `delay_ms` from now.
    pub fn schedule(&mut self, delay_ms: u64, task: Task) -> TimerId {
        self.push(delay_ms, None, task)
    }

    /// Run `task` every `interval_ms` (at least 1 ms) until cancelled.
    pub fn schedule_repeating(&mut self, interval_ms: u64, task: Task) -> TimerId {
        let interval = interval_ms.max(1);
        self.push(interval, Some(interval), task)
    }

    /// Cancel a pending entry. Returns whether it was still pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    #[must_use]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Earliest deadline among pending entries.
    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        self.entries.iter().map(|e| e.deadline).min()
    }

    /// Pop the earliest entry due at or before `until`, moving the clock to its deadline.
    ///
    /// Ties fire in scheduling order. Repeating entries are re-queued one
    /// interval later under the same id.
    pub fn pop_due(&mut self, until: u64) -> Option<(TimerId, Task)> {
        let (pos, _) = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.deadline <= until)
            .min_by_key(|(_, e)| (e.deadline, e.id))?;
        let entry = &mut self.entries[pos];
        self.now = self.now.max(entry.deadline);
        let fired = (entry.id, entry.task);
        let interval = entry.interval;
        match interval {
            Some(interval) => self.entries[pos].deadline += interval,
            None => {
                self.entries.remove(pos);
            }
        }
        Some(fired)
    }

    /// Move the clock forward without firing anything.
    pub fn advance_clock(&mut self, to: u64) {
        self.now = self.now.max(to);
    }

    /// Number of pending entries whose task satisfies `pred`.
    pub fn count(&self, pred: impl Fn(&Task) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.task)).count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, delay_ms: u64, interval: Option<u64>, task: Task) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.entries.push(Entry { id, deadline: self.now.saturating_add(delay_ms), interval, task });
        id
    }
}

/// At most one live timer per purpose `K`.
#[derive(Debug, Clone)]
pub struct TimerSlots<K> {
    slots: HashMap<K, TimerId>,
}

impl<K> Default for TimerSlots<K> {
    fn default() -> Self {
        Self { slots: HashMap::new() }
    }
}

impl<K: Copy + Eq + Hash> TimerSlots<K> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel whatever `kind` holds, then schedule a one-shot.
    pub fn arm(&mut self, timers: &mut TimerQueue, kind: K, delay_ms: u64, task: Task) -> TimerId {
        self.disarm(timers, kind);
        let id = timers.schedule(delay_ms, task);
        self.slots.insert(kind, id);
        id
    }

    /// Cancel whatever `kind` holds, then schedule a repeating timer.
    pub fn arm_repeating(&mut self, timers: &mut TimerQueue, kind: K, interval_ms: u64, task: Task) -> TimerId {
        self.disarm(timers, kind);
        let id = timers.schedule_repeating(interval_ms, task);
        self.slots.insert(kind, id);
        id
    }

    /// Cancel the timer held for `kind`. Returns whether one was held.
    pub fn disarm(&mut self, timers: &mut TimerQueue, kind: K) -> bool {
        match self.slots.remove(&kind) {
            Some(id) => {
                timers.cancel(id);
                true
            }
            None => false,
        }
    }

    pub fn disarm_all(&mut self, timers: &mut TimerQueue) {
        for (_, id) in self.slots.drain() {
            timers.cancel(id);
        }
    }

    #[must_use]
    pub fn is_armed(&self, kind: K) -> bool {
        self.slots.contains_key(&kind)
    }

    /// Whether `id` is the timer currently held for `kind`.
    #[must_use]
    pub fn owns(&self, kind: K, id: TimerId) -> bool {
        self.slots.get(&kind) == Some(&id)
    }

    /// Release a one-shot slot after it fired. Returns `false` for a stale id.
    pub fn settle(&mut self, kind: K, id: TimerId) -> bool {
        if self.owns(kind, id) {
            self.slots.remove(&kind);
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
