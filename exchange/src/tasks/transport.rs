use std::future::Future;

use crate::error::TransportError;
use crate::message::Message;

/// Async counterpart of [`crate::threads::Transport`].
pub trait Transport: Send + Sync + 'static {
    fn send(&self, message: &Message) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Waits until a message arrives, the peer goes away or the transport is closed.
    fn receive(&self) -> impl Future<Output = Result<Message, TransportError>> + Send;

    /// Releases the endpoint and wakes a pending `receive`. Idempotent.
    fn close(&self) -> impl Future<Output = ()> + Send;
}
