//! State of a rendezvous gate, shared by both rendezvous flavours.

use std::net::SocketAddr;

use crate::error::SetupError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum Gate {
    #[default]
    Pending,
    Open(SocketAddr),
    Abandoned,
}

impl Gate {
    /// Moves a pending gate to `outcome`. Returns whether anything changed.
    pub(crate) fn settle(&mut self, outcome: Gate) -> bool {
        if *self == Gate::Pending {
            *self = outcome;
            true
        } else {
            false
        }
    }

    pub(crate) fn is_pending(&self) -> bool {
        *self == Gate::Pending
    }

    pub(crate) fn outcome(self) -> Result<SocketAddr, SetupError> {
        match self {
            Gate::Open(addr) => Ok(addr),
            Gate::Abandoned | Gate::Pending => Err(SetupError::RendezvousAbandoned),
        }
    }
}
