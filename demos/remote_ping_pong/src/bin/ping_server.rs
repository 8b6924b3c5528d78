//! Responder side of a two-process exchange. Start it first:
//!
//! ```text
//! cargo run --bin ping_server -- 127.0.0.1:8085
//! ```

use rally_exchange::{
    config,
    threads::{Player, TransportConfig},
    PlayerConfig, PlayerError,
};
use rally_rt::threads as rt;

fn main() {
    rt::run(|| {
        if let Err(error) = serve() {
            tracing::error!(%error, "ping server failed");
            std::process::exit(1);
        }
    })
}

fn serve() -> Result<(), PlayerError> {
    let addr = match config::addr_from_env() {
        Ok(addr) => addr,
        Err(error) => {
            tracing::warn!(%error, "using default address");
            config::DEFAULT_ADDR
        }
    };
    tracing::info!(%addr, "waiting for a client");

    let player = Player::new(
        PlayerConfig::responder(),
        TransportConfig::Listen {
            addr,
            rendezvous: None,
        },
    )?;
    let summary = player.run_loop()?;
    tracing::info!(?summary, "exchange finished");
    Ok(())
}
