//! Initiator side of a two-process exchange. Run it once `ping_server` is listening:
//!
//! ```text
//! RALLY_MAX_MESSAGES=5 cargo run --bin ping_client -- 127.0.0.1:8085
//! ```

use rally_exchange::{
    config,
    threads::{Player, TransportConfig},
    PlayerConfig, PlayerError,
};
use rally_rt::threads as rt;

const CONTENT: &str = "this is a message number: ";

fn main() {
    rt::run(|| {
        if let Err(error) = play() {
            tracing::error!(%error, "ping client failed");
            std::process::exit(1);
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

    let player = Player::new(
        PlayerConfig::initiator().with_max_messages(max_messages),
        TransportConfig::Connect {
            addr,
            rendezvous: None,
        },
    )?
    .start();
    player.seed(CONTENT)?;

    let summary = player.join()?;
    tracing::info!(?summary, "exchange finished");
    Ok(())
}
