//! Runtime wrapper to keep runtime dependencies out of the exchange code.
//!
//! Two flavours are exposed:
//! - [`threads`]: plain OS threads and blocking crossbeam channels.
//! - [`tasks`]: the tokio runtime, its networking and sync primitives.
//!
//! Only the pieces the exchange engine needs are reexported. Extend as needed.

pub mod tasks;
pub mod threads;
mod tracing;
