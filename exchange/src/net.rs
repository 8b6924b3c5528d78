//! Socket plumbing shared by the blocking and async socket transports.

use std::io;
use std::net::{SocketAddr, TcpListener};

use socket2::{Domain, Protocol, SockRef, Socket, Type};

use crate::config::socket::{BACKLOG, KEEP_ALIVE, LINGER};

/// Binds a listening socket with `SO_REUSEADDR`, so a quick restart on the
/// well-known port does not trip over a connection still in `TIME_WAIT`.
pub(crate) fn bind_listener(addr: SocketAddr) -> io::Result<TcpListener> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.listen(BACKLOG)?;
    Ok(socket.into())
}

/// Applies keep-alive and linger. The read timeout is up to each transport.
pub(crate) fn configure<'s, S>(stream: &'s S) -> io::Result<()>
where
    SockRef<'s>: From<&'s S>,
{
    let socket = SockRef::from(stream);
    socket.set_keepalive(KEEP_ALIVE)?;
    socket.set_linger(Some(LINGER))?;
    Ok(())
}

/// Address a connector should dial once the listener published where it is bound.
///
/// A listener bound to a wildcard address is reached on the configured host.
pub(crate) fn dial_target(configured: SocketAddr, published: SocketAddr) -> SocketAddr {
    if published.ip().is_unspecified() {
        SocketAddr::new(configured.ip(), published.port())
    } else {
        published
    }
}
