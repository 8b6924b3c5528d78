//! In-process transport over a pair of unbounded FIFO queues.

use std::sync::Mutex;

use rally_rt::threads::mpsc::{self, select, Receiver, Sender};

use crate::error::TransportError;
use crate::message::Message;

use super::Transport;

/// One endpoint of a queue pair.
///
/// Each endpoint owns its inbox. Sending enqueues on the peer's inbox and never
/// blocks; receiving takes from its own inbox, blocking until something is there.
/// Once either side closes, sends towards it fail with [`TransportError::Disconnected`].
pub struct QueueTransport {
    inbox: Mutex<Option<Receiver<Message>>>,
    outbox: Mutex<Option<Sender<Message>>>,
    // Dropping the sender wakes a receive blocked on `closed`.
    close_tx: Mutex<Option<Sender<()>>>,
    closed: Receiver<()>,
}

impl QueueTransport {
    /// Two endpoints wired to each other.
    pub fn pair() -> (Self, Self) {
        let (a_tx, a_rx) = mpsc::unbounded_channel();
        let (b_tx, b_rx) = mpsc::unbounded_channel();
        (Self::new(a_rx, b_tx), Self::new(b_rx, a_tx))
    }

    fn new(inbox: Receiver<Message>, outbox: Sender<Message>) -> Self {
        let (close_tx, closed) = mpsc::channel(0);
        Self {
            inbox: Mutex::new(Some(inbox)),
            outbox: Mutex::new(Some(outbox)),
            close_tx: Mutex::new(Some(close_tx)),
            closed,
        }
    }

    /// Messages waiting in this endpoint's inbox. Zero once closed.
    pub fn pending(&self) -> usize {
        self.inbox
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .as_ref()
            .map_or(0, Receiver::len)
    }
}

impl Transport for QueueTransport {
    fn send(&self, message: &Message) -> Result<(), TransportError> {
        let outbox = self.outbox.lock().unwrap_or_else(|p| p.into_inner());
        match outbox.as_ref() {
            Some(peer) => peer
                .send(message.clone())
                .map_err(|_| TransportError::Disconnected),
            None => Err(TransportError::Closed),
        }
    }

    fn receive(&self) -> Result<Message, TransportError> {
        // A clone, so `close` can release the inbox while we block on it.
        let inbox = self
            .inbox
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
            .ok_or(TransportError::Closed)?;
        select! {
            recv(inbox) -> message => message.map_err(|_| TransportError::Disconnected),
            recv(self.closed) -> _ => Err(TransportError::Closed),
        }
    }

    fn close(&self) {
        // Dropping our sender tells the peer we are gone once it drained its inbox.
        self.outbox
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take();
        // Dropping the inbox makes the peer's sends fail instead of piling up.
        self.inbox.lock().unwrap_or_else(|p| p.into_inner()).take();
        self.close_tx
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take();
    }
}
