//! Async transport over a single TCP connection, same framing as the blocking one.

use std::net::SocketAddr;

use rally_rt::tasks::{
    io::AsyncWriteExt,
    net::{OwnedReadHalf, OwnedWriteHalf, TcpListener, TcpStream},
    select,
    sync::Mutex,
    timeout, CancellationToken, FramedRead, LengthDelimitedCodec, StreamExt,
};

use crate::codec::{self, MAX_FRAME_LEN};
use crate::config::socket::READ_TIMEOUT;
use crate::error::{SetupError, TransportError};
use crate::message::Message;
use crate::net;

use super::{Rendezvous, Transport};

pub struct SocketTransport {
    reader: Mutex<FramedRead<OwnedReadHalf, LengthDelimitedCodec>>,
    writer: Mutex<Option<OwnedWriteHalf>>,
    peer: SocketAddr,
    closed: CancellationToken,
}

impl SocketTransport {
    /// Binds `addr`, opens `rendezvous` with the bound address and waits for a single peer.
    pub async fn listen(
        addr: SocketAddr,
        rendezvous: Option<&Rendezvous>,
    ) -> Result<Self, SetupError> {
        let (listener, local) = match bind(addr) {
            Ok(bound) => bound,
            Err(source) => {
                if let Some(rendezvous) = rendezvous {
                    rendezvous.abandon();
                }
                return Err(SetupError::Bind { addr, source });
            }
        };

        tracing::debug!(%local, "listening");
        if let Some(rendezvous) = rendezvous {
            rendezvous.open(local);
        }

        let (stream, peer) = listener.accept().await.map_err(SetupError::Accept)?;
        tracing::debug!(%peer, "accepted connection");
        Self::from_stream(stream)
    }

    /// Dials `addr`, or the address published on `rendezvous` once the listener is ready.
    pub async fn connect(
        addr: SocketAddr,
        rendezvous: Option<&Rendezvous>,
    ) -> Result<Self, SetupError> {
        let target = match rendezvous {
            Some(rendezvous) => net::dial_target(addr, rendezvous.wait().await?),
            None => addr,
        };
        let stream = TcpStream::connect(target)
            .await
            .map_err(|source| SetupError::Connect {
                addr: target,
                source,
            })?;
        tracing::debug!(peer = %target, "connected");
        Self::from_stream(stream)
    }

    pub fn from_stream(stream: TcpStream) -> Result<Self, SetupError> {
        net::configure(&stream).map_err(SetupError::Configure)?;
        let peer = stream.peer_addr().map_err(SetupError::Configure)?;
        let (read, write) = stream.into_split();
        let codec = LengthDelimitedCodec::builder()
            .max_frame_length(MAX_FRAME_LEN)
            .new_codec();

        Ok(Self {
            reader: Mutex::new(FramedRead::new(read, codec)),
            writer: Mutex::new(Some(write)),
            peer,
            closed: CancellationToken::new(),
        })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}

fn bind(addr: SocketAddr) -> std::io::Result<(TcpListener, SocketAddr)> {
    let listener = net::bind_listener(addr)?;
    listener.set_nonblocking(true)?;
    let listener = TcpListener::from_std(listener)?;
    let local = listener.local_addr()?;
    Ok((listener, local))
}

impl Transport for SocketTransport {
    async fn send(&self, message: &Message) -> Result<(), TransportError> {
        let frame = codec::encode_frame(message)?;
        let mut writer = self.writer.lock().await;
        let writer = writer.as_mut().ok_or(TransportError::Closed)?;
        writer.write_all(&frame).await?;
        writer.flush().await?;
        Ok(())
    }

    async fn receive(&self) -> Result<Message, TransportError> {
        if self.closed.is_cancelled() {
            return Err(TransportError::Closed);
        }
        let mut reader = self.reader.lock().await;
        select! {
            biased;
            _ = self.closed.cancelled() => Err(TransportError::Closed),
            frame = timeout(READ_TIMEOUT, reader.next()) => match frame {
                Err(_) => Err(TransportError::Timeout),
                Ok(None) => Err(TransportError::Disconnected),
                Ok(Some(Err(error))) => Err(TransportError::from_read(error)),
                Ok(Some(Ok(payload))) => Ok(codec::decode(&payload)?),
            },
        }
    }

    async fn close(&self) {
        self.closed.cancel();
        let writer = self.writer.lock().await.take();
        if let Some(mut writer) = writer {
            if let Err(error) = writer.shutdown().await {
                tracing::debug!(%error, "socket already shut down");
            }
        }
    }
}
