use std::{
    net::SocketAddr,
    sync::mpsc,
    time::{Duration, Instant},
};

use rally_rt::threads as rt;

use crate::error::SetupError;
use crate::threads::{Rendezvous, SocketTransport};

fn addr(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}

#[test]
pub fn test_wait_after_open_returns_immediately() {
    let rendezvous = Rendezvous::new();
    rendezvous.open(addr(4000));

    assert!(rendezvous.is_open());
    assert_eq!(rendezvous.wait().unwrap(), addr(4000));
    // Waiting again on a fired gate is fine.
    assert_eq!(rendezvous.wait().unwrap(), addr(4000));
}

#[test]
pub fn test_gate_fires_once() {
    let rendezvous = Rendezvous::new();
    rendezvous.open(addr(4000));
    rendezvous.open(addr(5000));
    rendezvous.abandon();

    assert_eq!(rendezvous.wait().unwrap(), addr(4000));
}

#[test]
pub fn test_waiter_blocks_until_open() {
    let rendezvous = Rendezvous::new();
    let waiter = rendezvous.clone();
    let (tx, rx) = mpsc::channel();

    let handle = rt::spawn(move || {
        let result = waiter.wait();
        tx.send(()).unwrap();
        result
    });

    // Still blocked while the gate is closed.
    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());

    rendezvous.open(addr(4001));
    assert!(rx.recv_timeout(Duration::from_secs(2)).is_ok());
    assert_eq!(handle.join().unwrap().unwrap(), addr(4001));
}

#[test]
pub fn test_abandoned_gate_fails_waiters() {
    let rendezvous = Rendezvous::new();
    let waiter = rendezvous.clone();
    let handle = rt::spawn(move || waiter.wait());

    rendezvous.abandon();
    assert!(matches!(
        handle.join().unwrap(),
        Err(SetupError::RendezvousAbandoned)
    ));
    assert!(!rendezvous.is_open());
}

#[test]
pub fn test_wait_timeout_expires() {
    let rendezvous = Rendezvous::new();
    let started = Instant::now();
    let result = rendezvous.wait_timeout(Duration::from_millis(100));

    assert!(matches!(result, Err(SetupError::RendezvousTimeout(_))));
    assert!(started.elapsed() >= Duration::from_millis(100));
}

#[test]
pub fn test_connector_waits_for_delayed_listener() {
    let rendezvous = Rendezvous::new();
    let listener_gate = rendezvous.clone();

    let listener = rt::spawn(move || {
        // Give the connector a head start: it must wait, not get a refused connection.
        rt::sleep(Duration::from_millis(300));
        SocketTransport::listen(addr(0), Some(&listener_gate))
    });

    let started = Instant::now();
    let connector = SocketTransport::connect(addr(0), Some(&rendezvous));
    assert!(connector.is_ok(), "connector failed: {:?}", connector.as_ref().err());
    assert!(started.elapsed() >= Duration::from_millis(300));

    let listener = listener.join().unwrap().unwrap();
    assert_eq!(
        listener.peer_addr().ip(),
        connector.unwrap().peer_addr().ip()
    );
}

#[test]
pub fn test_bind_failure_abandons_rendezvous() {
    // Hold the port so the second bind fails.
    let taken = std::net::TcpListener::bind(addr(0)).unwrap();
    let port = taken.local_addr().unwrap().port();

    let rendezvous = Rendezvous::new();
    let waiter = rendezvous.clone();
    let connector = rt::spawn(move || SocketTransport::connect(addr(port), Some(&waiter)));

    let listener = SocketTransport::listen(addr(port), Some(&rendezvous));
    assert!(matches!(listener, Err(SetupError::Bind { .. })));
    assert!(matches!(
        connector.join().unwrap(),
        Err(SetupError::RendezvousAbandoned)
    ));
}
