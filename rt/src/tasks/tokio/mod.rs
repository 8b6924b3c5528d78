//! Tokio.rs reexports to prevent tokio dependencies within external code
pub mod mpsc;

pub use tokio::{
    runtime::Runtime,
    select,
    task::{spawn, spawn_blocking, JoinHandle},
    time::{error::Elapsed, sleep, timeout},
};
pub use tokio_stream::StreamExt;
pub use tokio_util::codec::{FramedRead, LengthDelimitedCodec};
pub use tokio_util::sync::CancellationToken;

pub mod io {
    pub use tokio::io::{AsyncReadExt, AsyncWriteExt};
}

pub mod net {
    pub use tokio::net::{
        tcp::{OwnedReadHalf, OwnedWriteHalf},
        TcpListener, TcpStream,
    };
}

pub mod sync {
    pub use tokio::sync::{watch, Mutex};
}
