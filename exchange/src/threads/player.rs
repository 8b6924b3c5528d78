//! The ping-pong player, threads-based (blocking) version.
//! See demos/ping_pong_threads and demos/ping_pong_tcp for usage examples.

use std::{
    fmt::Debug,
    panic::{catch_unwind, AssertUnwindSafe},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};

use rally_rt::threads::{self as rt, JoinHandle};

use crate::config::PlayerConfig;
use crate::error::{PlayerError, SetupError, TransportError};
use crate::message::Message;
use crate::player::{Counters, ExchangeSummary, Role, StopReason};

use super::{SocketTransport, Transport, TransportConfig};

/// A participant in the exchange.
///
/// The loop runs on one thread ([`Player::run_loop`]); `seed`, `shutdown` and the
/// counters may be used from any other.
pub struct Player {
    config: PlayerConfig,
    transport: Box<dyn Transport>,
    counters: Counters,
    // Serializes sends against each other and against closing the transport.
    send_lock: Mutex<()>,
    seeded: AtomicBool,
}

impl Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("role", &self.config.role)
            .field("max_messages", &self.config.max_messages)
            .field("sent", &self.sent())
            .field("received", &self.received())
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl Player {
    /// Builds the transport described by `transport` and binds a player to it.
    ///
    /// For sockets this blocks until the connection is established.
    pub fn new(config: PlayerConfig, transport: TransportConfig) -> Result<Self, SetupError> {
        let transport: Box<dyn Transport> = match transport {
            TransportConfig::Queue(queue) => Box::new(queue),
            TransportConfig::Listen { addr, rendezvous } => {
                Box::new(SocketTransport::listen(addr, rendezvous.as_ref())?)
            }
            TransportConfig::Connect { addr, rendezvous } => {
                Box::new(SocketTransport::connect(addr, rendezvous.as_ref())?)
            }
        };
        Ok(Self::with_transport(config, transport))
    }

    pub fn with_transport(config: PlayerConfig, transport: impl Transport + 'static) -> Self {
        Self {
            config,
            transport: Box::new(transport),
            counters: Counters::new(),
            send_lock: Mutex::new(()),
            seeded: AtomicBool::new(false),
        }
    }

    pub fn role(&self) -> Role {
        self.config.role
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
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

    /// Sends the first message of the exchange, counter 1. Initiator only, once.
    pub fn seed(&self, content: impl Into<String>) -> Result<(), PlayerError> {
        if self.role() != Role::Initiator {
            return Err(PlayerError::NotInitiator);
        }
        if self.seeded.swap(true, Ordering::SeqCst) {
            return Err(PlayerError::AlreadySeeded);
        }
        self.send(Message::seed(content))?;
        Ok(())
    }

    /// Runs the exchange until a STOP is sent or received, the player is shut down
    /// or the transport fails. The transport is released on every exit path.
    pub fn run_loop(&self) -> Result<ExchangeSummary, PlayerError> {
        tracing::debug!(role = %self.role(), "player loop started");
        let result = self.exchange();
        self.shutdown();

        match result {
            Ok(reason) => {
                let summary = self.summary(reason);
                tracing::debug!(?summary, "player loop finished");
                Ok(summary)
            }
            Err(error) => {
                tracing::warn!(role = %self.role(), %error, sent = self.sent(), received = self.received(), "exchange aborted");
                Err(error.into())
            }
        }
    }

    /// Stops the player and releases its transport. Safe to call any number of
    /// times from any thread.
    pub fn shutdown(&self) {
        let _guard = self.send_lock.lock().unwrap_or_else(|p| p.into_inner());
        if self.counters.stop() {
            self.transport.close();
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

    /// Spawns [`Player::run_loop`] on a dedicated thread.
    pub fn start(self) -> PlayerHandle {
        let player = Arc::new(self);
        let runner = player.clone();
        let body = move || {
            catch_unwind(AssertUnwindSafe(|| runner.run_loop())).unwrap_or_else(|panic| {
                tracing::error!("Panic in player loop: {panic:?}");
                runner.shutdown();
                Err(PlayerError::Panicked)
            })
        };
        let name = player.role().to_string();
        let handle = match rt::spawn_named(&name, body.clone()) {
            Ok(handle) => handle,
            Err(error) => {
                tracing::warn!(%error, "Failed to name player thread");
                rt::spawn(body)
            }
        };
        PlayerHandle { player, handle }
    }

    fn exchange(&self) -> Result<StopReason, TransportError> {
        while self.is_running() {
            if self.config.should_stop(self.sent(), self.received()) {
                tracing::info!(role = %self.role(), sent = self.sent(), received = self.received(), "limit reached, sending stop");
                self.send(Message::stop())?;
                return Ok(StopReason::StopSent);
            }

            let message = match self.transport.receive() {
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

            // The check at the top of the loop sends STOP instead of a reply.
            if self.config.should_stop(self.sent(), received) {
                continue;
            }
            self.send(message.reply()?)?;
        }
        Ok(StopReason::Shutdown)
    }

    /// Sends under the send lock. Any failure shuts the player down.
    ///
    /// A NORMAL message is counted before it is handed to the transport, so the
    /// reply can never be observed while `sent` is still behind.
    fn send(&self, message: Message) -> Result<(), TransportError> {
        let result = {
            let _guard = self.send_lock.lock().unwrap_or_else(|p| p.into_inner());
            if !self.is_running() {
                Err(TransportError::Closed)
            } else {
                let counted = !message.is_stop();
                if counted {
                    self.counters.record_sent();
                }
                let result = self.transport.send(&message);
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
            self.shutdown();
        }
        result
    }
}

/// A player running on its own thread.
#[derive(Debug)]
pub struct PlayerHandle {
    player: Arc<Player>,
    handle: JoinHandle<Result<ExchangeSummary, PlayerError>>,
}

impl PlayerHandle {
    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn seed(&self, content: impl Into<String>) -> Result<(), PlayerError> {
        self.player.seed(content)
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

    pub fn shutdown(&self) {
        self.player.shutdown()
    }

    /// Waits for the loop to finish.
    pub fn join(self) -> Result<ExchangeSummary, PlayerError> {
        self.handle.join().unwrap_or(Err(PlayerError::Panicked))
    }
}
