//! State shared by the blocking and the async players.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Which side of the exchange a player is on. Fixed at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// Seeds the exchange and owns the stop decision.
    Initiator,
    /// Echoes every message back until it receives STOP.
    Responder,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Initiator => write!(f, "initiator"),
            Role::Responder => write!(f, "responder"),
        }
    }
}

/// Why a player loop ended without an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// The initiator reached its limit and sent STOP.
    StopSent,
    /// A STOP message arrived.
    StopReceived,
    /// `shutdown` was called from outside the loop.
    Shutdown,
}

/// Final counters of a finished player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExchangeSummary {
    pub role: Role,
    pub sent: u32,
    pub received: u32,
    pub reason: StopReason,
}

/// Sent/received counters and the running flag.
///
/// Only NORMAL messages are counted. `running` goes from true to false exactly once.
#[derive(Debug)]
pub(crate) struct Counters {
    sent: AtomicU32,
    received: AtomicU32,
    running: AtomicBool,
}

impl Counters {
    pub(crate) fn new() -> Self {
        Self {
            sent: AtomicU32::new(0),
            received: AtomicU32::new(0),
            running: AtomicBool::new(true),
        }
    }

    pub(crate) fn sent(&self) -> u32 {
        self.sent.load(Ordering::SeqCst)
    }

    pub(crate) fn received(&self) -> u32 {
        self.received.load(Ordering::SeqCst)
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub(crate) fn record_sent(&self) -> u32 {
        self.sent.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Takes back a send that never reached the transport.
    pub(crate) fn unrecord_sent(&self) {
        self.sent.fetch_sub(1, Ordering::SeqCst);
    }

    pub(crate) fn record_received(&self) -> u32 {
        self.received.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Returns true for the one caller that actually stopped the player.
    pub(crate) fn stop(&self) -> bool {
        self.running.swap(false, Ordering::SeqCst)
    }
}
