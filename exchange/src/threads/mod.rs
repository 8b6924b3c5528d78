//! Threads-based (blocking) players, transports and rendezvous.
//! One OS thread per player; `receive` is the only place a player waits.

mod player;
mod queue;
mod rendezvous;
mod socket;
mod transport;

#[cfg(test)]
mod rendezvous_tests;

pub use player::{Player, PlayerHandle};
pub use queue::QueueTransport;
pub use rendezvous::Rendezvous;
pub use socket::SocketTransport;
pub use transport::{Transport, TransportConfig};
