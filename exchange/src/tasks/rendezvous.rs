use std::{net::SocketAddr, sync::Arc, time::Duration};

use rally_rt::tasks::{sync::watch, timeout};

use crate::error::SetupError;
use crate::gate::Gate;

/// Async counterpart of [`crate::threads::Rendezvous`], on a `watch` channel.
#[derive(Clone, Debug)]
pub struct Rendezvous {
    gate: Arc<watch::Sender<Gate>>,
}

impl Default for Rendezvous {
    fn default() -> Self {
        let (gate, _) = watch::channel(Gate::Pending);
        Self {
            gate: Arc::new(gate),
        }
    }
}

impl Rendezvous {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self, addr: SocketAddr) {
        self.gate.send_if_modified(|gate| gate.settle(Gate::Open(addr)));
    }

    pub fn abandon(&self) {
        self.gate.send_if_modified(|gate| gate.settle(Gate::Abandoned));
    }

    pub fn is_open(&self) -> bool {
        matches!(*self.gate.borrow(), Gate::Open(_))
    }

    pub async fn wait(&self) -> Result<SocketAddr, SetupError> {
        let mut gate = self.gate.subscribe();
        gate.wait_for(|gate| !gate.is_pending())
            .await
            .map(|gate| *gate)
            .unwrap_or(Gate::Abandoned)
            .outcome()
    }

    pub async fn wait_timeout(&self, duration: Duration) -> Result<SocketAddr, SetupError> {
        timeout(duration, self.wait())
            .await
            .unwrap_or(Err(SetupError::RendezvousTimeout(duration)))
    }
}
