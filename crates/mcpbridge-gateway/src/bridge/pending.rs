use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use dashmap::{DashMap, DashSet};
use tokio::task::AbortHandle;

use super::controllers::ControllerId;

/// A command forwarded to the host and not yet answered.
#[derive(Debug)]
pub struct PendingEntry {
    pub controller: ControllerId,
    /// The controller's own id, restored on the relayed response.
    pub request_id: Option<String>,
    pub command: String,
    /// Host connection the command was delivered on.
    pub generation: Option<u64>,
    pub started: Instant,
    /// Timeout task; aborted when the request resolves any other way.
    timer: Option<AbortHandle>,
}

impl PendingEntry {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

/// Pending requests keyed by bridge-assigned wire id.
///
/// Controllers choose their own ids and may collide with each other, so the
/// host only ever sees wire ids (`b<seq>`). Each entry is also indexed under
/// its controller so a disconnect can discard that controller's requests.
/// `complete` removes an entry exactly once, whichever of reply, timeout or
/// host loss gets there first.
#[derive(Default)]
pub struct PendingTable {
    entries: DashMap<String, PendingEntry>,
    by_controller: DashMap<ControllerId, DashSet<String>>,
    seq: AtomicU64,
}

impl PendingTable {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            by_controller: DashMap::new(),
            seq: AtomicU64::new(1),
        }
    }

    /// Record a request and return the wire id to forward it under.
    pub fn insert(&self, controller: ControllerId, request_id: Option<String>, command: String) -> String {
        let wire_id = format!("b{}", self.seq.fetch_add(1, Ordering::Relaxed));

        self.by_controller
            .entry(controller)
            .or_insert_with(DashSet::new)
            .insert(wire_id.clone());

        self.entries.insert(
            wire_id.clone(),
            PendingEntry {
                controller,
                request_id,
                command,
                generation: None,
                started: Instant::now(),
                timer: None,
            },
        );
        wire_id
    }

    pub fn bind_generation(&self, wire_id: &str, generation: u64) {
        if let Some(mut e) = self.entries.get_mut(wire_id) {
            e.generation = Some(generation);
        }
    }

    /// Attach the timeout task of a request. Aborts it right away if the
    /// request already resolved.
    pub fn arm(&self, wire_id: &str, timer: AbortHandle) {
        match self.entries.get_mut(wire_id) {
            Some(mut e) => e.timer = Some(timer),
            None => timer.abort(),
        }
    }

    fn unindex(&self, controller: ControllerId, wire_id: &str) {
        if let Some(set) = self.by_controller.get(&controller) {
            set.remove(wire_id);
            if set.is_empty() {
                drop(set);
                self.by_controller.remove_if(&controller, |_, s| s.is_empty());
            }
        }
    }

    /// Resolve a request. `None` if it was already resolved or never existed.
    pub fn complete(&self, wire_id: &str) -> Option<PendingEntry> {
        let mut entry = self.remove(wire_id)?;
        entry.cancel_timer();
        Some(entry)
    }

    /// Resolve a request from inside its own timeout task.
    pub fn expire(&self, wire_id: &str) -> Option<PendingEntry> {
        let mut entry = self.remove(wire_id)?;
        entry.timer = None;
        Some(entry)
    }

    fn remove(&self, wire_id: &str) -> Option<PendingEntry> {
        let (_, entry) = self.entries.remove(wire_id)?;
        self.unindex(entry.controller, wire_id);
        Some(entry)
    }

    /// Forget every request of a departed controller.
    pub fn drop_controller(&self, controller: ControllerId) -> usize {
        let Some((_, wire_ids)) = self.by_controller.remove(&controller) else {
            return 0;
        };
        let mut dropped = 0;
        for w in wire_ids.iter() {
            if let Some((_, mut entry)) = self.entries.remove(w.key()) {
                entry.cancel_timer();
                dropped += 1;
            }
        }
        dropped
    }

    /// Resolve every request delivered on a host connection that went away.
    pub fn take_generation(&self, generation: u64) -> Vec<PendingEntry> {
        let wire_ids: Vec<String> = self
            .entries
            .iter()
            .filter(|e| e.value().generation == Some(generation))
            .map(|e| e.key().clone())
            .collect();

        wire_ids.iter().filter_map(|w| self.complete(w)).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count_for(&self, controller: ControllerId) -> usize {
        self.by_controller.get(&controller).map(|s| s.len()).unwrap_or(0)
    }
}
