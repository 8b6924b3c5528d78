//! The unit exchanged between players.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ProtocolViolation;

/// Counter carried by the seed message.
pub const START_COUNT: i32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageType {
    /// Regular exchange hop.
    Normal,
    /// Termination request. Carries no meaningful content or counter.
    Stop,
}

/// A message travelling between two players.
///
/// Every hop copies `content` unchanged and bumps `counter` by one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    content: String,
    kind: MessageType,
    counter: i32,
}

impl Message {
    pub fn normal(content: impl Into<String>, counter: i32) -> Self {
        Self {
            content: content.into(),
            kind: MessageType::Normal,
            counter,
        }
    }

    /// The first message of an exchange.
    pub fn seed(content: impl Into<String>) -> Self {
        Self::normal(content, START_COUNT)
    }

    pub fn stop() -> Self {
        Self {
            content: String::new(),
            kind: MessageType::Stop,
            counter: 0,
        }
    }

    /// The next hop: same content, counter incremented by exactly one.
    ///
    /// A counter that cannot be incremented is reported instead of wrapping negative.
    pub fn reply(&self) -> Result<Self, ProtocolViolation> {
        let counter = self
            .counter
            .checked_add(1)
            .ok_or(ProtocolViolation::CounterOverflow(self.counter))?;
        Ok(Self::normal(self.content.clone(), counter))
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn kind(&self) -> MessageType {
        self.kind
    }

    pub fn counter(&self) -> i32 {
        self.counter
    }

    pub fn is_stop(&self) -> bool {
        self.kind == MessageType::Stop
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MessageType::Normal => write!(f, "{}{}", self.content, self.counter),
            MessageType::Stop => write!(f, "STOP"),
        }
    }
}
