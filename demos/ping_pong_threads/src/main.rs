//! Two players in one process, one thread each, talking over in-memory queues.

use rally_exchange::{
    config,
    threads::{Player, QueueTransport, TransportConfig},
    PlayerConfig, PlayerError,
};
use rally_rt::threads as rt;

const CONTENT: &str = "this is a message number: ";

fn main() {
    rt::run(|| {
        if let Err(error) = play() {
            tracing::error!(%error, "exchange failed");
        }
    })
}

fn play() -> Result<(), PlayerError> {
    let max_messages = config::max_messages_from_env().unwrap_or_else(|error| {
        tracing::warn!(%error, "using default message limit");
        config::DEFAULT_MAX_MESSAGES
    });
    let (a, b) = QueueTransport::pair();

    let initiator = Player::new(
        PlayerConfig::initiator().with_max_messages(max_messages),
        TransportConfig::Queue(a),
    )?
    .start();
    let responder = Player::new(PlayerConfig::responder(), TransportConfig::Queue(b))?.start();

    initiator.seed(CONTENT)?;

    let initiator = initiator.join()?;
    let responder = responder.join()?;
    tracing::info!(?initiator, ?responder, "exchange finished");
    Ok(())
}
