//! In-process transport over a pair of unbounded tokio channels.

use std::sync::Mutex as StdMutex;

use rally_rt::tasks::{
    mpsc::{self, UnboundedReceiver, UnboundedSender},
    select,
    sync::Mutex,
    CancellationToken,
};

use crate::error::TransportError;
use crate::message::Message;

use super::Transport;

/// One endpoint of a queue pair. Once either side closes, sends towards it fail
/// with [`TransportError::Disconnected`].
pub struct QueueTransport {
    inbox: Mutex<UnboundedReceiver<Message>>,
    outbox: StdMutex<Option<UnboundedSender<Message>>>,
    closed: CancellationToken,
}

impl QueueTransport {
    /// Two endpoints wired to each other.
    pub fn pair() -> (Self, Self) {
        let (a_tx, a_rx) = mpsc::unbounded_channel();
        let (b_tx, b_rx) = mpsc::unbounded_channel();
        (Self::new(a_rx, b_tx), Self::new(b_rx, a_tx))
    }

    fn new(inbox: UnboundedReceiver<Message>, outbox: UnboundedSender<Message>) -> Self {
        Self {
            inbox: Mutex::new(inbox),
            outbox: StdMutex::new(Some(outbox)),
            closed: CancellationToken::new(),
        }
    }
}

impl Transport for QueueTransport {
    async fn send(&self, message: &Message) -> Result<(), TransportError> {
        let outbox = self.outbox.lock().unwrap_or_else(|p| p.into_inner());
        match outbox.as_ref() {
            Some(peer) => peer
                .send(message.clone())
                .map_err(|_| TransportError::Disconnected),
            None => Err(TransportError::Closed),
        }
    }

    async fn receive(&self) -> Result<Message, TransportError> {
        if self.closed.is_cancelled() {
            return Err(TransportError::Closed);
        }
        let mut inbox = self.inbox.lock().await;
        select! {
            biased;
            _ = self.closed.cancelled() => Err(TransportError::Closed),
            message = inbox.recv() => message.ok_or(TransportError::Disconnected),
        }
    }

    async fn close(&self) {
        self.closed.cancel();
        self.outbox
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take();
        // A pending receive lets go of the inbox as soon as it sees the cancellation.
        self.inbox.lock().await.close();
    }
}
