//! Two players as tokio tasks, first over in-memory queues and then over TCP.

use rally_exchange::{
    config,
    tasks::{Player, QueueTransport, Rendezvous, SocketTransport, Transport},
    ExchangeSummary, PlayerConfig, PlayerError,
};
use rally_rt::tasks as rt;

const CONTENT: &str = "this is a message number: ";

fn main() {
    rt::run(async {
        let max_messages = config::max_messages_from_env().unwrap_or_else(|error| {
            tracing::warn!(%error, "using default message limit");
            config::DEFAULT_MAX_MESSAGES
        });

        let (a, b) = QueueTransport::pair();
        match play(a, b, max_messages).await {
            Ok((initiator, responder)) => {
                tracing::info!(?initiator, ?responder, "queue exchange finished")
            }
            Err(error) => tracing::error!(%error, "queue exchange failed"),
        }

        match connect().await {
            Ok((server, client)) => match play(server, client, max_messages).await {
                Ok((initiator, responder)) => {
                    tracing::info!(?initiator, ?responder, "socket exchange finished")
                }
                Err(error) => tracing::error!(%error, "socket exchange failed"),
            },
            Err(error) => tracing::error!(%error, "could not set up the connection"),
        }
    })
}

async fn play<A: Transport, B: Transport>(
    initiator: A,
    responder: B,
    max_messages: u32,
) -> Result<(ExchangeSummary, ExchangeSummary), PlayerError> {
    let initiator = Player::new(
        PlayerConfig::initiator().with_max_messages(max_messages),
        initiator,
    )
    .start();
    let responder = Player::new(PlayerConfig::responder(), responder).start();

    initiator.seed(CONTENT).await?;
    Ok((initiator.join().await?, responder.join().await?))
}

async fn connect() -> Result<(SocketTransport, SocketTransport), PlayerError> {
    let addr = config::addr_from_env().unwrap_or_else(|error| {
        tracing::warn!(%error, "using default address");
        config::DEFAULT_ADDR
    });
    let rendezvous = Rendezvous::new();

    let listener = {
        let rendezvous = rendezvous.clone();
        rt::spawn(async move { SocketTransport::listen(addr, Some(&rendezvous)).await })
    };
    rendezvous.wait_timeout(config::RENDEZVOUS_TIMEOUT).await?;
    let client = SocketTransport::connect(addr, Some(&rendezvous)).await?;
    let server = listener.await.map_err(|_| PlayerError::Panicked)??;
    Ok((server, client))
}
