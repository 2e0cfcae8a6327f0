//! Id table for host-owned element handles.
//!
//! The browser host keeps its live elements in a [`HandleTable`] so that a
//! [`NodeId`] held by a controller maps back to the element. Ids are never
//! reused: a forgotten id stays unknown instead of aliasing a newer handle.
//!
//! The table sweeps lazily. [`HandleTable::sweep`] only scans once the table
//! has grown to twice its size after the previous scan, so the cost per host
//! step stays constant.

#[cfg(test)]
#[path = "handles_test.rs"]
mod handles_test;

use std::collections::HashMap;

use crate::dom::NodeId;

/// Smallest table size that triggers a sweep.
pub const MIN_SWEEP: usize = 64;

#[derive(Debug)]
pub struct HandleTable<T> {
    entries: HashMap<NodeId, T>,
    next: u32,
    sweep_at: usize,
}

impl<T> Default for HandleTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HandleTable<T> {
    #[must_use]
    pub fn new() -> Self {
        Self { entries: HashMap::new(), next: 0, sweep_at: MIN_SWEEP }
    }

    /// Store `handle` under a fresh id.
    pub fn insert(&mut self, handle: T) -> NodeId {
        let id = NodeId(self.next);
        self.next = self.next.wrapping_add(1);
        self.entries.insert(id, handle);
        id
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.entries.get(&id)
    }

    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn remove(&mut self, id: NodeId) -> Option<T> {
        self.entries.remove(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every handle `keep` rejects and return the dropped handles.
    pub fn retain(&mut self, mut keep: impl FnMut(NodeId, &T) -> bool) -> Vec<T> {
        self.entries.extract_if(|id, handle| !keep(*id, &*handle)).map(|(_, handle)| handle).collect()
    }

    /// [`HandleTable::retain`], but only once the table has outgrown its
    /// watermark. The next watermark is twice the surviving size.
    pub fn sweep(&mut self, keep: impl FnMut(NodeId, &T) -> bool) -> Vec<T> {
        if self.entries.len() < self.sweep_at {
            return Vec::new();
        }
        let dropped = self.retain(keep);
        self.sweep_at = (self.entries.len() * 2).max(MIN_SWEEP);
        log::debug!("handles: swept {} of {}", dropped.len(), dropped.len() + self.entries.len());
        dropped
    }
}
