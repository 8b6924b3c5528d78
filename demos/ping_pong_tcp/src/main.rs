//! Two players in one process talking over a loopback TCP connection.
//!
//! The initiator listens on `RALLY_ADDR` (default 127.0.0.1:8085). The responder
//! waits on the rendezvous until the listener is bound, then dials it.

use rally_exchange::{
    config,
    threads::{Player, Rendezvous, TransportConfig},
    ExchangeSummary, PlayerConfig, PlayerError,
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
    let addr = config::addr_from_env().unwrap_or_else(|error| {
        tracing::warn!(%error, "using default address");
        config::DEFAULT_ADDR
    });
    let max_messages = config::max_messages_from_env().unwrap_or_else(|error| {
        tracing::warn!(%error, "using default message limit");
        config::DEFAULT_MAX_MESSAGES
    });
    let rendezvous = Rendezvous::new();

    // Accepting blocks, so the listening side gets built on its own thread.
    let listener = {
        let rendezvous = rendezvous.clone();
        rt::spawn(move || -> Result<ExchangeSummary, PlayerError> {
            let player = Player::new(
                PlayerConfig::initiator().with_max_messages(max_messages),
                TransportConfig::Listen {
                    addr,
                    rendezvous: Some(rendezvous),
                },
            )?;
            player.seed(CONTENT)?;
            player.run_loop()
        })
    };

    let published = rendezvous.wait_timeout(config::RENDEZVOUS_TIMEOUT)?;
    tracing::info!(%published, "listener ready");
    let responder = Player::new(
        PlayerConfig::responder(),
        TransportConfig::Connect {
            addr,
            rendezvous: Some(rendezvous),
        },
    )?
    .start();

    let responder = responder.join()?;
    let initiator = listener.join().unwrap_or(Err(PlayerError::Panicked))?;
    tracing::info!(?initiator, ?responder, "exchange finished");
    Ok(())
}
