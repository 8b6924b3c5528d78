//! Blocking channels backed by crossbeam.
//!
//! Unlike `std::sync::mpsc`, both halves are `Sync` and can be raced with `select!`.

pub use crossbeam::channel::{
    bounded as channel, select, unbounded as unbounded_channel, Receiver, RecvError,
    RecvTimeoutError, SendError, Sender, TryRecvError,
};
