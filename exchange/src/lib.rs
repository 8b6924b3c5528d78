//! # rally-exchange
//!
//! A bounded ping-pong exchange between two players.
//!
//! One player is the **initiator**: it seeds the exchange with a message whose
//! counter is 1 and decides when the exchange is over. The other is the
//! **responder**: it answers every message with the same content and the counter
//! incremented by one, until it receives a STOP message.
//!
//! Once the initiator has both sent and received `max_messages` messages it sends
//! STOP instead of a reply. Both players then release their transport.
//!
//! ## Transports
//!
//! - **Queue**: a pair of in-process FIFO queues ([`threads::QueueTransport`]).
//! - **Socket**: one TCP connection carrying length-prefixed frames
//!   ([`threads::SocketTransport`]). The listener publishes its readiness through a
//!   [`threads::Rendezvous`] so the connector never dials too early.
//!
//! ## Quick start
//!
//! ```ignore
//! use rally_exchange::{threads::{Player, QueueTransport, TransportConfig}, PlayerConfig};
//!
//! let (a, b) = QueueTransport::pair();
//! let initiator = Player::new(PlayerConfig::initiator(), TransportConfig::Queue(a))?.start();
//! let responder = Player::new(PlayerConfig::responder(), TransportConfig::Queue(b))?.start();
//!
//! initiator.seed("this is a message number: ")?;
//! let summary = initiator.join()?;
//! assert_eq!((summary.sent, summary.received), (10, 10));
//! ```
//!
//! ## Backends
//!
//! - [`threads`]: one OS thread per player, blocking transports.
//! - [`tasks`]: one tokio task per player, async transports. Same wire format, so an
//!   async player can talk to a blocking one.

pub mod codec;
pub mod config;
pub mod error;
mod gate;
pub mod message;
mod net;
pub mod player;
pub mod tasks;
pub mod threads;

pub use config::PlayerConfig;
pub use error::{ConfigError, PlayerError, ProtocolViolation, SetupError, TransportError};
pub use message::{Message, MessageType};
pub use player::{ExchangeSummary, Role, StopReason};
