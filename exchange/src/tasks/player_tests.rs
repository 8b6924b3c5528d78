use std::{net::SocketAddr, sync::Arc, time::Duration};

use rally_rt::tasks::{self as rt, io::AsyncWriteExt, net::TcpListener};

use crate::config::PlayerConfig;
use crate::error::{PlayerError, ProtocolViolation, SetupError, TransportError};
use crate::message::Message;
use crate::player::{ExchangeSummary, StopReason};
use crate::tasks::{Player, QueueTransport, Rendezvous, SocketTransport, Transport};
use crate::threads;

const CONTENT: &str = "this is a message number: ";

fn loopback() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 0))
}

async fn socket_pair() -> (SocketTransport, SocketTransport) {
    let rendezvous = Rendezvous::new();
    let gate = rendezvous.clone();
    let listener = rt::spawn(async move { SocketTransport::listen(loopback(), Some(&gate)).await });
    let connector = SocketTransport::connect(loopback(), Some(&rendezvous))
        .await
        .unwrap();
    (listener.await.unwrap().unwrap(), connector)
}

/// A transport whose `send` only returns well after the message was delivered.
struct SlowSend<T> {
    inner: T,
    delay: Duration,
}

impl<T: Transport> Transport for SlowSend<T> {
    async fn send(&self, message: &Message) -> Result<(), TransportError> {
        self.inner.send(message).await?;
        rt::sleep(self.delay).await;
        Ok(())
    }

    async fn receive(&self) -> Result<Message, TransportError> {
        self.inner.receive().await
    }

    async fn close(&self) {
        self.inner.close().await
    }
}

async fn exchange<A: Transport, B: Transport>(
    initiator: A,
    responder: B,
    max_messages: u32,
) -> (ExchangeSummary, ExchangeSummary) {
    let initiator = Player::new(
        PlayerConfig::initiator().with_max_messages(max_messages),
        initiator,
    )
    .start();
    let responder = Player::new(PlayerConfig::responder(), responder).start();

    initiator.seed(CONTENT).await.unwrap();
    (
        initiator.join().await.unwrap(),
        responder.join().await.unwrap(),
    )
}

#[test]
pub fn test_three_message_exchange_over_queue() {
    let runtime = rt::Runtime::new().unwrap();
    runtime.block_on(async move {
        let (a, b) = QueueTransport::pair();
        let (initiator, responder) = exchange(a, b, 3).await;

        assert_eq!((initiator.sent, initiator.received), (3, 3));
        assert_eq!(initiator.reason, StopReason::StopSent);
        assert_eq!((responder.sent, responder.received), (3, 3));
        assert_eq!(responder.reason, StopReason::StopReceived);
    });
}

#[test]
pub fn test_socket_exchange_matches_queue_exchange() {
    let runtime = rt::Runtime::new().unwrap();
    runtime.block_on(async move {
        let (a, b) = QueueTransport::pair();
        let over_queue = exchange(a, b, 10).await;

        let (server, client) = socket_pair().await;
        let over_socket = exchange(server, client, 10).await;

        assert_eq!(over_queue, over_socket);
    });
}

#[test]
pub fn test_responder_replies_with_next_counter() {
    let runtime = rt::Runtime::new().unwrap();
    runtime.block_on(async move {
        let (driver, endpoint) = QueueTransport::pair();
        let responder = Player::new(PlayerConfig::responder().with_max_messages(1), endpoint).start();

        for counter in [1, 3, 5] {
            driver.send(&Message::normal(CONTENT, counter)).await.unwrap();
            let reply = driver.receive().await.unwrap();
            assert_eq!(reply.counter(), counter + 1);
        }
        driver.send(&Message::stop()).await.unwrap();

        let summary = responder.join().await.unwrap();
        assert_eq!((summary.sent, summary.received), (3, 3));
        assert!(matches!(
            driver.receive().await,
            Err(TransportError::Disconnected)
        ));
    });
}

#[test]
pub fn test_async_initiator_with_blocking_responder() {
    let runtime = rt::Runtime::new().unwrap();
    runtime.block_on(async move {
        let rendezvous = Rendezvous::new();
        let gate = rendezvous.clone();
        let listener = rt::spawn(async move { SocketTransport::listen(loopback(), Some(&gate)).await });
        let addr = rendezvous.wait().await.unwrap();

        let responder = rt::spawn_blocking(move || -> Result<ExchangeSummary, PlayerError> {
            let player = threads::Player::new(
                PlayerConfig::responder(),
                threads::TransportConfig::Connect {
                    addr,
                    rendezvous: None,
                },
            )?;
            player.run_loop()
        });

        let transport = listener.await.unwrap().unwrap();
        let initiator = Player::new(PlayerConfig::initiator().with_max_messages(4), transport).start();
        initiator.seed(CONTENT).await.unwrap();

        let initiator = initiator.join().await.unwrap();
        let responder = responder.await.unwrap().unwrap();
        assert_eq!((initiator.sent, initiator.received), (4, 4));
        assert_eq!((responder.sent, responder.received), (4, 4));
        assert_eq!(responder.reason, StopReason::StopReceived);
    });
}

#[test]
pub fn test_shutdown_stops_idle_player() {
    let runtime = rt::Runtime::new().unwrap();
    runtime.block_on(async move {
        let (a, _b) = QueueTransport::pair();
        let handle = Player::new(PlayerConfig::responder(), a).start();
        rt::sleep(Duration::from_millis(50)).await;

        handle.shutdown().await;
        handle.shutdown().await;
        assert!(!handle.is_running());

        let summary = handle.join().await.unwrap();
        assert_eq!(summary.reason, StopReason::Shutdown);
    });
}

#[test]
pub fn test_seed_rules() {
    let runtime = rt::Runtime::new().unwrap();
    runtime.block_on(async move {
        let (a, b) = QueueTransport::pair();
        let initiator = Player::new(PlayerConfig::initiator(), a);
        let responder = Player::new(PlayerConfig::responder(), b);

        assert!(matches!(
            responder.seed(CONTENT).await,
            Err(PlayerError::NotInitiator)
        ));
        initiator.seed(CONTENT).await.unwrap();
        assert!(matches!(
            initiator.seed(CONTENT).await,
            Err(PlayerError::AlreadySeeded)
        ));
    });
}

#[test]
pub fn test_peer_failure_stops_early() {
    let runtime = rt::Runtime::new().unwrap();
    runtime.block_on(async move {
        let (server, client) = socket_pair().await;
        let initiator = Player::new(PlayerConfig::initiator(), server).start();
        initiator.seed(CONTENT).await.unwrap();

        assert_eq!(client.receive().await.unwrap().counter(), 1);
        client.close().await;
        drop(client);

        let result = initiator.join().await;
        assert!(matches!(
            result,
            Err(PlayerError::Transport(TransportError::Disconnected))
        ));
    });
}

#[test]
pub fn test_rendezvous_blocks_until_open() {
    let runtime = rt::Runtime::new().unwrap();
    runtime.block_on(async move {
        let rendezvous = Rendezvous::new();
        let waiter = rendezvous.clone();

        let pending = rendezvous.wait_timeout(Duration::from_millis(100)).await;
        assert!(matches!(pending, Err(SetupError::RendezvousTimeout(_))));

        let task = rt::spawn(async move { waiter.wait().await });
        rt::sleep(Duration::from_millis(50)).await;
        assert!(!task.is_finished());

        let addr = SocketAddr::from(([127, 0, 0, 1], 4242));
        rendezvous.open(addr);
        rendezvous.abandon();
        assert_eq!(task.await.unwrap().unwrap(), addr);
        assert!(rendezvous.is_open());
    });
}

#[test]
pub fn test_abandoned_rendezvous_fails_connector() {
    let runtime = rt::Runtime::new().unwrap();
    runtime.block_on(async move {
        let rendezvous = Rendezvous::new();
        rendezvous.abandon();

        let result = SocketTransport::connect(loopback(), Some(&rendezvous)).await;
        assert!(matches!(result, Err(SetupError::RendezvousAbandoned)));
    });
}

#[test]
pub fn test_reply_racing_a_slow_seed_still_converges() {
    let runtime = rt::Runtime::new().unwrap();
    runtime.block_on(async move {
        let (a, b) = QueueTransport::pair();
        let slow = SlowSend {
            inner: a,
            delay: Duration::from_millis(100),
        };
        let (initiator, responder) = exchange(slow, b, 1).await;

        assert_eq!((initiator.sent, initiator.received), (1, 1));
        assert_eq!(initiator.reason, StopReason::StopSent);
        assert_eq!((responder.sent, responder.received), (1, 1));
    });
}

#[test]
pub fn test_concurrent_shutdown_is_idempotent() {
    let runtime = rt::Runtime::new().unwrap();
    runtime.block_on(async move {
        let (a, _b) = QueueTransport::pair();
        let handle = Arc::new(Player::new(PlayerConfig::responder(), a).start());
        rt::sleep(Duration::from_millis(50)).await;

        let callers: Vec<_> = (0..8)
            .map(|_| {
                let handle = handle.clone();
                rt::spawn(async move { handle.shutdown().await })
            })
            .collect();
        for caller in callers {
            caller.await.unwrap();
        }
        assert!(!handle.is_running());

        let handle = Arc::try_unwrap(handle).unwrap();
        let summary = handle.join().await.unwrap();
        assert_eq!(summary.reason, StopReason::Shutdown);
        assert_eq!((summary.sent, summary.received), (0, 0));
    });
}

#[test]
pub fn test_malformed_payload_is_fatal() {
    let runtime = rt::Runtime::new().unwrap();
    runtime.block_on(async move {
        let listener = TcpListener::bind(loopback()).await.unwrap();
        let addr = listener.local_addr().unwrap();

        let connector = rt::spawn(async move { SocketTransport::connect(addr, None).await });
        let (mut raw, _) = listener.accept().await.unwrap();
        let transport = connector.await.unwrap().unwrap();

        raw.write_all(&[0, 0, 0, 3, 0xff, 0xff, 0xff]).await.unwrap();
        let responder = Player::new(PlayerConfig::responder(), transport).start();

        assert!(matches!(
            responder.join().await,
            Err(PlayerError::Transport(TransportError::Protocol(
                ProtocolViolation::Decode(_)
            )))
        ));
    });
}

#[test]
pub fn test_counter_overflow_is_fatal() {
    let runtime = rt::Runtime::new().unwrap();
    runtime.block_on(async move {
        let (driver, endpoint) = QueueTransport::pair();
        let responder = Player::new(PlayerConfig::responder(), endpoint).start();

        driver
            .send(&Message::normal(CONTENT, i32::MAX))
            .await
            .unwrap();

        assert!(matches!(
            responder.join().await,
            Err(PlayerError::Transport(TransportError::Protocol(
                ProtocolViolation::CounterOverflow(i32::MAX)
            )))
        ));
    });
}
