use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::mpsc::{self, error::TrySendError};

/// Per-connection controller id, assigned by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControllerId(pub u64);

impl fmt::Display for ControllerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// Connected controllers: `ControllerId -> outbound queue`.
#[derive(Default)]
pub struct ControllerRegistry {
    conns: DashMap<ControllerId, mpsc::Sender<Message>>,
    seq: AtomicU64,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self {
            conns: DashMap::new(),
            seq: AtomicU64::new(1),
        }
    }

    pub fn register(&self, tx: mpsc::Sender<Message>) -> ControllerId {
        let id = ControllerId(self.seq.fetch_add(1, Ordering::Relaxed));
        self.conns.insert(id, tx);
        id
    }

    pub fn remove(&self, id: ControllerId) -> bool {
        self.conns.remove(&id).is_some()
    }

    pub fn contains(&self, id: ControllerId) -> bool {
        self.conns.contains_key(&id)
    }

    /// Queue a frame for a controller without waiting. False when the
    /// controller is gone or its queue is full.
    pub fn send(&self, id: ControllerId, msg: Message) -> bool {
        let Some(tx) = self.conns.get(&id).map(|r| r.value().clone()) else {
            return false;
        };
        match tx.try_send(msg) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!(controller = %id, "controller queue full, response dropped");
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.conns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conns.is_empty()
    }
}
