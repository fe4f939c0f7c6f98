use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use axum::extract::ws::Message;
use tokio::sync::mpsc::{self, error::TrySendError};

/// Lifecycle of the single host executor slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostState {
    Absent,
    Connecting,
    Open,
    Closing,
}

impl HostState {
    pub fn as_str(self) -> &'static str {
        match self {
            HostState::Absent => "absent",
            HostState::Connecting => "connecting",
            HostState::Open => "open",
            HostState::Closing => "closing",
        }
    }
}

impl fmt::Display for HostState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Proof of which host connection a session owns. Transitions requested with
/// a stale lease (the connection was superseded) are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostLease {
    generation: u64,
}

impl HostLease {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NotOpen(HostState),
    QueueFull,
    /// The session behind the slot is gone.
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Accepted { generation: u64 },
    Rejected(RejectReason),
}

struct Slot {
    state: HostState,
    generation: u64,
    tx: Option<mpsc::Sender<Message>>,
}

/// The one live host executor connection.
///
/// Every transition and every `deliver` happens under one lock, so a command
/// is never accepted against a connection that is being superseded or closed.
/// A new connection supersedes the current one outright: the old sender is
/// dropped, which ends the old session's writer, and nothing is drained.
pub struct HostSlot {
    inner: Mutex<Slot>,
    next_generation: AtomicU64,
}

impl Default for HostSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl HostSlot {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Slot {
                state: HostState::Absent,
                generation: 0,
                tx: None,
            }),
            next_generation: AtomicU64::new(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        // Slot updates are single assignments; a poisoned guard is still consistent.
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn state(&self) -> HostState {
        self.lock().state
    }

    pub fn is_open(&self) -> bool {
        self.state() == HostState::Open
    }

    /// Claim the slot for a new connection (`-> connecting`).
    ///
    /// Returns the lease plus the generation it superseded, if any.
    pub fn begin_connect(&self) -> (HostLease, Option<u64>) {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let mut slot = self.lock();

        let superseded = match slot.state {
            HostState::Open | HostState::Connecting => Some(slot.generation),
            HostState::Absent | HostState::Closing => None,
        };

        slot.state = HostState::Connecting;
        slot.generation = generation;
        slot.tx = None;

        (HostLease { generation }, superseded)
    }

    /// `connecting -> open`. False if the lease was superseded meanwhile.
    pub fn open(&self, lease: HostLease, tx: mpsc::Sender<Message>) -> bool {
        let mut slot = self.lock();
        if slot.generation != lease.generation || slot.state != HostState::Connecting {
            return false;
        }
        slot.state = HostState::Open;
        slot.tx = Some(tx);
        true
    }

    /// `open|connecting -> closing`; deliveries are refused from here on.
    pub fn begin_close(&self, lease: HostLease) -> bool {
        let mut slot = self.lock();
        if slot.generation != lease.generation || slot.state == HostState::Absent {
            return false;
        }
        slot.state = HostState::Closing;
        slot.tx = None;
        true
    }

    /// `-> absent`, if the lease still owns the slot.
    pub fn release(&self, lease: HostLease) -> bool {
        let mut slot = self.lock();
        if slot.generation != lease.generation {
            return false;
        }
        slot.state = HostState::Absent;
        slot.tx = None;
        true
    }

    /// Hand a frame to the live host without waiting.
    pub fn deliver(&self, msg: Message) -> Delivery {
        self.deliver_then(msg, |_| {})
    }

    /// Like `deliver`, but runs `on_accept` with the connection's generation
    /// before the slot lock is released. A host disconnect cannot slip
    /// between acceptance and whatever `on_accept` records.
    pub fn deliver_then(&self, msg: Message, on_accept: impl FnOnce(u64)) -> Delivery {
        let slot = self.lock();
        if slot.state != HostState::Open {
            return Delivery::Rejected(RejectReason::NotOpen(slot.state));
        }
        let Some(tx) = slot.tx.as_ref() else {
            return Delivery::Rejected(RejectReason::Closed);
        };
        match tx.try_send(msg) {
            Ok(()) => {
                on_accept(slot.generation);
                Delivery::Accepted {
                    generation: slot.generation,
                }
            }
            Err(TrySendError::Full(_)) => Delivery::Rejected(RejectReason::QueueFull),
            Err(TrySendError::Closed(_)) => Delivery::Rejected(RejectReason::Closed),
        }
    }
}
