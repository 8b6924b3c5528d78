//! IO-threads based module, the blocking counterpart of [`crate::tasks`].

pub mod mpsc;

pub use std::thread::{sleep, spawn, JoinHandle};

use crate::tracing::init_tracing;

pub fn run(f: fn()) {
    init_tracing();

    f()
}

/// Spawn blocking is the same as spawn for pure threaded usage.
pub fn spawn_blocking<F, R>(f: F) -> JoinHandle<R>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    spawn(f)
}

/// Spawns a thread carrying `name`, which shows up in log lines and panics.
pub fn spawn_named<F, R>(name: &str, f: F) -> std::io::Result<JoinHandle<R>>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    std::thread::Builder::new().name(name.to_string()).spawn(f)
}
