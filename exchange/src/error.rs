//! Error taxonomy of the exchange.
//!
//! - [`SetupError`]: the connection could not be established. Aborts player construction.
//! - [`TransportError`]: a send or receive failed. Fatal for the player that hit it.
//! - [`ProtocolViolation`]: the bytes on the wire are not a message. Surfaces as a
//!   [`TransportError`] and is handled the same way.
//!
//! None of them are retried. The player that observes one shuts itself down and the
//! peer finds out on its own, through its read timeout or a STOP message.

use std::{io, net::SocketAddr, time::Duration};

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("failed to bind listener on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("failed to accept connection: {0}")]
    Accept(#[source] io::Error),
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("failed to configure socket: {0}")]
    Configure(#[source] io::Error),
    #[error("listener abandoned the rendezvous before it was ready")]
    RendezvousAbandoned,
    #[error("listener was not ready after {0:?}")]
    RendezvousTimeout(Duration),
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("no message received within the read timeout")]
    Timeout,
    #[error("peer disconnected")]
    Disconnected,
    #[error("transport closed")]
    Closed,
    #[error(transparent)]
    Protocol(#[from] ProtocolViolation),
}

impl TransportError {
    /// Maps a read error, folding the platform's timeout kinds into [`TransportError::Timeout`]
    /// and a short read into [`TransportError::Disconnected`].
    pub(crate) fn from_read(error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => Self::Timeout,
            io::ErrorKind::UnexpectedEof
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted => Self::Disconnected,
            _ => Self::Io(error),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProtocolViolation {
    #[error("failed to encode message: {0}")]
    Encode(#[source] bincode::Error),
    #[error("payload is not a message: {0}")]
    Decode(#[source] bincode::Error),
    #[error("frame of {len} bytes exceeds the {max} byte limit")]
    FrameTooLarge { len: usize, max: usize },
    #[error("counter {0} cannot be incremented")]
    CounterOverflow(i32),
}

#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    #[error(transparent)]
    Setup(#[from] SetupError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("only the initiator can seed the exchange")]
    NotInitiator,
    #[error("the exchange was already seeded")]
    AlreadySeeded,
    #[error("player loop panicked")]
    Panicked,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid address '{0}'")]
    InvalidAddress(String),
    #[error("invalid message limit '{0}'")]
    InvalidMaxMessages(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_errors_are_classified() {
        let timeout = io::Error::new(io::ErrorKind::WouldBlock, "read timed out");
        assert!(matches!(
            TransportError::from_read(timeout),
            TransportError::Timeout
        ));

        let eof = io::Error::new(io::ErrorKind::UnexpectedEof, "eof");
        assert!(matches!(
            TransportError::from_read(eof),
            TransportError::Disconnected
        ));

        let other = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        assert!(matches!(
            TransportError::from_read(other),
            TransportError::Io(_)
        ));
    }

    #[test]
    fn protocol_violation_displays_through_transport_error() {
        let error = TransportError::from(ProtocolViolation::FrameTooLarge {
            len: 100_000,
            max: 65_536,
        });
        assert_eq!(
            error.to_string(),
            "frame of 100000 bytes exceeds the 65536 byte limit"
        );
    }
}
