//! Tasks-based (async) players, transports and rendezvous on the tokio runtime.
//! Mirrors [`crate::threads`]: one task per player, suspended only in `receive`.

mod player;
mod queue;
mod rendezvous;
mod socket;
mod transport;

#[cfg(test)]
mod player_tests;

pub use player::{Player, PlayerHandle};
pub use queue::QueueTransport;
pub use rendezvous::Rendezvous;
pub use socket::SocketTransport;
pub use transport::Transport;
