//! Player configuration and the fixed socket options.

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr, ToSocketAddrs},
    time::Duration,
};

use crate::error::ConfigError;
use crate::player::Role;

/// Number of messages the initiator sends and receives before it stops the exchange.
pub const DEFAULT_MAX_MESSAGES: u32 = 10;

/// Well-known address shared out of band by the listener and the connector.
pub const DEFAULT_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8085);

/// Environment variable overriding [`DEFAULT_ADDR`] in the demos.
pub const ADDR_ENV: &str = "RALLY_ADDR";

/// Environment variable overriding [`DEFAULT_MAX_MESSAGES`] in the demos.
pub const MAX_MESSAGES_ENV: &str = "RALLY_MAX_MESSAGES";

/// How long the demos let a connector wait for its listener.
pub const RENDEZVOUS_TIMEOUT: Duration = Duration::from_secs(30);

/// Socket options applied to every exchange connection. Not tunable.
pub mod socket {
    use std::time::Duration;

    pub const KEEP_ALIVE: bool = true;
    /// Buffered bytes get this long to flush on close.
    pub const LINGER: Duration = Duration::from_millis(1000);
    /// A silent peer is declared dead after this long.
    pub const READ_TIMEOUT: Duration = Duration::from_millis(5000);
    pub const BACKLOG: i32 = 1;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerConfig {
    pub role: Role,
    pub max_messages: u32,
}

impl PlayerConfig {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            max_messages: DEFAULT_MAX_MESSAGES,
        }
    }

    pub fn initiator() -> Self {
        Self::new(Role::Initiator)
    }

    pub fn responder() -> Self {
        Self::new(Role::Responder)
    }

    pub fn with_max_messages(mut self, max_messages: u32) -> Self {
        self.max_messages = max_messages;
        self
    }

    /// Only the initiator ever decides to stop, once both counters reached the limit.
    pub fn should_stop(&self, sent: u32, received: u32) -> bool {
        self.role == Role::Initiator && sent >= self.max_messages && received >= self.max_messages
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self::initiator()
    }
}

/// Resolves an address given as `host:port`, falling back to [`DEFAULT_ADDR`].
pub fn resolve_addr(value: Option<&str>) -> Result<SocketAddr, ConfigError> {
    let Some(value) = value else {
        return Ok(DEFAULT_ADDR);
    };
    value
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .ok_or_else(|| ConfigError::InvalidAddress(value.to_string()))
}

pub fn parse_max_messages(value: Option<&str>) -> Result<u32, ConfigError> {
    match value {
        None => Ok(DEFAULT_MAX_MESSAGES),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidMaxMessages(value.to_string())),
    }
}

/// Address from the first CLI argument, then `RALLY_ADDR`, then the default.
pub fn addr_from_env() -> Result<SocketAddr, ConfigError> {
    let value = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(ADDR_ENV).ok());
    resolve_addr(value.as_deref())
}

pub fn max_messages_from_env() -> Result<u32, ConfigError> {
    parse_max_messages(std::env::var(MAX_MESSAGES_ENV).ok().as_deref())
}
