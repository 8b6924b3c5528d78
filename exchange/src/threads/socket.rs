//! Blocking transport over a single TCP connection.

use std::{
    io::{BufReader, BufWriter},
    net::{Shutdown, SocketAddr, TcpStream},
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
};

use crate::codec;
use crate::config::socket::READ_TIMEOUT;
use crate::error::{SetupError, TransportError};
use crate::message::Message;
use crate::net;

use super::{Rendezvous, Transport};

/// One end of a TCP connection carrying length-prefixed message frames.
///
/// Keep-alive is on, linger is 1 s and reads time out after 5 s of silence.
#[derive(Debug)]
pub struct SocketTransport {
    stream: TcpStream,
    reader: Mutex<BufReader<TcpStream>>,
    writer: Mutex<BufWriter<TcpStream>>,
    peer: SocketAddr,
    closed: AtomicBool,
}

impl SocketTransport {
    /// Binds `addr`, opens `rendezvous` with the bound address and blocks until a
    /// single peer connects. The listening socket is dropped afterwards.
    ///
    /// If binding fails the rendezvous is abandoned so the connector does not wait forever.
    pub fn listen(addr: SocketAddr, rendezvous: Option<&Rendezvous>) -> Result<Self, SetupError> {
        let bound = net::bind_listener(addr).and_then(|listener| {
            let local = listener.local_addr()?;
            Ok((listener, local))
        });
        let (listener, local) = match bound {
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

        let (stream, peer) = listener.accept().map_err(SetupError::Accept)?;
        tracing::debug!(%peer, "accepted connection");
        Self::from_stream(stream)
    }

    /// Dials `addr`. With a rendezvous, first waits for the listener to be ready
    /// and dials the address it published instead.
    pub fn connect(addr: SocketAddr, rendezvous: Option<&Rendezvous>) -> Result<Self, SetupError> {
        let target = match rendezvous {
            Some(rendezvous) => net::dial_target(addr, rendezvous.wait()?),
            None => addr,
        };
        let stream = TcpStream::connect(target).map_err(|source| SetupError::Connect {
            addr: target,
            source,
        })?;
        tracing::debug!(peer = %target, "connected");
        Self::from_stream(stream)
    }

    /// Wraps an established connection, applying the socket options.
    pub fn from_stream(stream: TcpStream) -> Result<Self, SetupError> {
        net::configure(&stream).map_err(SetupError::Configure)?;
        stream
            .set_read_timeout(Some(READ_TIMEOUT))
            .map_err(SetupError::Configure)?;
        let peer = stream.peer_addr().map_err(SetupError::Configure)?;
        let reader = stream.try_clone().map_err(SetupError::Configure)?;
        let writer = stream.try_clone().map_err(SetupError::Configure)?;

        Ok(Self {
            stream,
            reader: Mutex::new(BufReader::new(reader)),
            writer: Mutex::new(BufWriter::new(writer)),
            peer,
            closed: AtomicBool::new(false),
        })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Transport for SocketTransport {
    fn send(&self, message: &Message) -> Result<(), TransportError> {
        let mut writer = self.writer.lock().unwrap_or_else(|p| p.into_inner());
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        codec::write_frame(&mut *writer, message)
    }

    fn receive(&self) -> Result<Message, TransportError> {
        let mut reader = self.reader.lock().unwrap_or_else(|p| p.into_inner());
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        codec::read_frame(&mut *reader).map_err(|error| {
            // A read woken up by our own close is not a peer failure.
            if self.is_closed() {
                TransportError::Closed
            } else {
                error
            }
        })
    }

    fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Err(error) = self.stream.shutdown(Shutdown::Both) {
            tracing::debug!(%error, "socket already shut down");
        }
    }
}
