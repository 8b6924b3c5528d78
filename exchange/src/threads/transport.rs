use std::net::SocketAddr;

use crate::error::TransportError;
use crate::message::Message;

use super::{QueueTransport, Rendezvous};

/// A reliable, ordered, bidirectional channel of [`Message`]s between two players.
///
/// Methods take `&self` so the player loop can block in `receive` while another
/// thread sends or closes.
pub trait Transport: Send + Sync {
    fn send(&self, message: &Message) -> Result<(), TransportError>;

    /// Blocks until a message arrives, the peer goes away or the transport is closed.
    fn receive(&self) -> Result<Message, TransportError>;

    /// Releases the endpoint and wakes a pending `receive`. Idempotent.
    fn close(&self);
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, message: &Message) -> Result<(), TransportError> {
        (**self).send(message)
    }

    fn receive(&self) -> Result<Message, TransportError> {
        (**self).receive()
    }

    fn close(&self) {
        (**self).close()
    }
}

/// How a player gets its transport.
pub enum TransportConfig {
    /// One end of an in-process [`QueueTransport::pair`].
    Queue(QueueTransport),
    /// Bind `addr`, open the rendezvous if any, then accept a single peer.
    Listen {
        addr: SocketAddr,
        rendezvous: Option<Rendezvous>,
    },
    /// Wait on the rendezvous if any, then dial `addr` (or the address it published).
    Connect {
        addr: SocketAddr,
        rendezvous: Option<Rendezvous>,
    },
}

impl std::fmt::Debug for TransportConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Queue(_) => f.write_str("Queue"),
            Self::Listen { addr, .. } => write!(f, "Listen({addr})"),
            Self::Connect { addr, .. } => write!(f, "Connect({addr})"),
        }
    }
}
