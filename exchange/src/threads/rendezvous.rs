//! One-shot gate keeping a socket connector from dialing before its listener is ready.

use std::{
    fmt::Debug,
    net::SocketAddr,
    sync::{Arc, Condvar, Mutex},
    time::{Duration, Instant},
};

use crate::error::SetupError;
use crate::gate::Gate;

/// The listener opens the gate once its socket is bound, publishing the bound address.
/// Connectors block in [`Rendezvous::wait`] until then.
///
/// The gate fires at most once. Waiting on a fired gate returns immediately.
#[derive(Clone, Default)]
pub struct Rendezvous {
    inner: Arc<(Mutex<Gate>, Condvar)>,
}

impl Debug for Rendezvous {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rendezvous")
            .field("gate", &self.gate())
            .finish()
    }
}

impl Rendezvous {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the listener as ready on `addr`. Only the first call has an effect.
    pub fn open(&self, addr: SocketAddr) {
        self.settle(Gate::Open(addr));
    }

    /// The listener gave up before becoming ready. Waiters fail with
    /// [`SetupError::RendezvousAbandoned`]. No effect once the gate is open.
    pub fn abandon(&self) {
        self.settle(Gate::Abandoned);
    }

    pub fn is_open(&self) -> bool {
        matches!(self.gate(), Gate::Open(_))
    }

    /// Blocks until the listener is ready and returns its address.
    pub fn wait(&self) -> Result<SocketAddr, SetupError> {
        let (lock, cvar) = &*self.inner;
        let mut gate = lock.lock().unwrap_or_else(|p| p.into_inner());
        while gate.is_pending() {
            gate = cvar.wait(gate).unwrap_or_else(|p| p.into_inner());
        }
        gate.outcome()
    }

    /// Like [`Rendezvous::wait`], failing with [`SetupError::RendezvousTimeout`]
    /// if the gate is still closed after `timeout`.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<SocketAddr, SetupError> {
        let deadline = Instant::now() + timeout;
        let (lock, cvar) = &*self.inner;
        let mut gate = lock.lock().unwrap_or_else(|p| p.into_inner());
        while gate.is_pending() {
            let now = Instant::now();
            if now >= deadline {
                return Err(SetupError::RendezvousTimeout(timeout));
            }
            gate = cvar
                .wait_timeout(gate, deadline - now)
                .map(|(gate, _)| gate)
                .unwrap_or_else(|p| p.into_inner().0);
        }
        gate.outcome()
    }

    fn settle(&self, outcome: Gate) {
        let (lock, cvar) = &*self.inner;
        let mut gate = lock.lock().unwrap_or_else(|p| p.into_inner());
        if gate.settle(outcome) {
            cvar.notify_all();
        }
    }

    fn gate(&self) -> Gate {
        *self.inner.0.lock().unwrap_or_else(|p| p.into_inner())
    }
}
