//! Runtime wrapper to remove dependencies from code. Using this module will
//! allow to set a tokio runtime or any other runtime, once implemented, without
//! touching the exchange code.
//!
//! Currently, only a very limited set of tokio functionality is reexported. We may want to
//! extend this functionality as needed.

mod tokio;

use std::future::Future;

use crate::tracing::init_tracing;

pub use crate::tasks::tokio::io;
pub use crate::tasks::tokio::mpsc;
pub use crate::tasks::tokio::net;
pub use crate::tasks::tokio::select;
pub use crate::tasks::tokio::sync;
pub use crate::tasks::tokio::{sleep, timeout, Elapsed};
pub use crate::tasks::tokio::CancellationToken;
pub use crate::tasks::tokio::{FramedRead, LengthDelimitedCodec, StreamExt};
pub use crate::tasks::tokio::{spawn, spawn_blocking, JoinHandle, Runtime};

pub fn run<F: Future>(future: F) -> F::Output {
    init_tracing();

    match Runtime::new() {
        Ok(rt) => rt.block_on(future),
        Err(e) => panic!("Failed to start tokio runtime: {e}"),
    }
}
