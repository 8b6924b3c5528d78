//! The ping-pong player, tasks-based (async) version.
//! See demos/ping_pong_tasks for a usage example.

use std::{
    fmt::Debug,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use rally_rt::tasks::{self as rt, sync::Mutex, JoinHandle};

use crate::config::PlayerConfig;
use crate::error::{PlayerError, TransportError};
use crate::message::Message;
use crate::player::{Counters, ExchangeSummary, Role, StopReason};

use super::Transport;

pub struct Player<T: Transport> {
    config: PlayerConfig,
    transport: T,
    counters: Counters,
    send_lock: Mutex<()>,
    seeded: AtomicBool,
}

impl<T: Transport> Debug for Player<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("role", &self.config.role)
            .field("sent", &self.sent())
            .field("received", &self.received())
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl<T: Transport> Player<T> {
    pub fn new(config: PlayerConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            counters: Counters::new(),
            send_lock: Mutex::new(()),
            seeded: AtomicBool::new(false),
        }
    }

    pub fn role(&self) -> Role {
        self.config.role
    }

    pub fn sent(&self) -> u32 {
        self.counters.sent()
    }

    pub fn received(&self) -> u32 {
        self.counters.received()
    }

    pub fn is_running(&self) -> bool {
        self.counters.is_running()
    }

    pub async fn seed(&self, content: impl Into<String>) -> Result<(), PlayerError> {
        if self.role() != Role::Initiator {
            return Err(PlayerError::NotInitiator);
        }
        if self.seeded.swap(true, Ordering::SeqCst) {
            return Err(PlayerError::AlreadySeeded);
        }
        self.send(Message::seed(content)).await?;
        Ok(())
    }

    pub async fn run_loop(&self) -> Result<ExchangeSummary, PlayerError> {
        tracing::debug!(role = %self.role(), "player task started");
        let result = self.exchange().await;
        self.shutdown().await;

        match result {
            Ok(reason) => Ok(self.summary(reason)),
            Err(error) => {
                tracing::warn!(role = %self.role(), %error, sent = self.sent(), received = self.received(), "exchange aborted");
                Err(error.into())
            }
        }
    }

    pub async fn shutdown(&self) {
        let _guard = self.send_lock.lock().await;
        if self.counters.stop() {
            self.transport.close().await;
            tracing::debug!(role = %self.role(), "player shut down");
        }
    }

    pub fn summary(&self, reason: StopReason) -> ExchangeSummary {
        ExchangeSummary {
            role: self.role(),
            sent: self.sent(),
            received: self.received(),
            reason,
        }
    }

    /// Spawns [`Player::run_loop`] as a task on the current runtime.
    pub fn start(self) -> PlayerHandle<T> {
        let player = Arc::new(self);
        let runner = player.clone();
        let handle = rt::spawn(async move { runner.run_loop().await });
        PlayerHandle { player, handle }
    }

    async fn exchange(&self) -> Result<StopReason, TransportError> {
        while self.is_running() {
            if self.config.should_stop(self.sent(), self.received()) {
                tracing::info!(role = %self.role(), sent = self.sent(), received = self.received(), "limit reached, sending stop");
                self.send(Message::stop()).await?;
                return Ok(StopReason::StopSent);
            }

            let message = match self.transport.receive().await {
                Ok(message) => message,
                Err(_) if !self.is_running() => break,
                Err(error) => return Err(error),
            };
            if message.is_stop() {
                tracing::info!(role = %self.role(), "received stop");
                return Ok(StopReason::StopReceived);
            }

            let received = self.counters.record_received();
            tracing::info!(role = %self.role(), counter = message.counter(), received, "{}", message.content());

            if self.config.should_stop(self.sent(), received) {
                continue;
            }
            self.send(message.reply()?).await?;
        }
        Ok(StopReason::Shutdown)
    }

    async fn send(&self, message: Message) -> Result<(), TransportError> {
        let result = {
            let _guard = self.send_lock.lock().await;
            if !self.is_running() {
                Err(TransportError::Closed)
            } else {
                // Counted up front: the peer may answer before `send` returns.
                let counted = !message.is_stop();
                if counted {
                    self.counters.record_sent();
                }
                let result = self.transport.send(&message).await;
                if counted && result.is_err() {
                    self.counters.unrecord_sent();
                }
                result
            }
        };

        if let Err(error) = &result {
            if self.is_running() {
                tracing::warn!(role = %self.role(), %error, "send failed");
            }
            self.shutdown().await;
        }
        result
    }
}

/// A player running as a task.
pub struct PlayerHandle<T: Transport> {
    player: Arc<Player<T>>,
    handle: JoinHandle<Result<ExchangeSummary, PlayerError>>,
}

impl<T: Transport> Debug for PlayerHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerHandle")
            .field("player", &self.player)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> PlayerHandle<T> {
    pub fn player(&self) -> &Player<T> {
        &self.player
    }

    pub async fn seed(&self, content: impl Into<String>) -> Result<(), PlayerError> {
        self.player.seed(content).await
    }

    pub fn is_running(&self) -> bool {
        self.player.is_running()
    }

    pub fn sent(&self) -> u32 {
        self.player.sent()
    }

    pub fn received(&self) -> u32 {
        self.player.received()
    }

    pub async fn shutdown(&self) {
        self.player.shutdown().await
    }

    pub async fn join(self) -> Result<ExchangeSummary, PlayerError> {
        match self.handle.await {
            Ok(result) => result,
            Err(error) => {
                tracing::error!("Panic in player task: {error:?}");
                self.player.shutdown().await;
                Err(PlayerError::Panicked)
            }
        }
    }
}
