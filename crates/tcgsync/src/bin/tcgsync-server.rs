//! Runs a tcgsync server configured from the environment.
//!
//! `RUST_LOG` controls log output (default `info`); see
//! [`ServerConfig::from_env`] for the server settings.

use tcgsync::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), TcgsyncError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env();
    tracing::info!(
        bind = %config.bind_addr,
        sounds_dir = %config.sounds_dir.display(),
        prize_cards = config.room.starting_prize_cards,
        "starting tcgsync"
    );

    let server = TcgsyncServer::builder().config(config).build().await?;
    server.run_until(ctrl_c()).await
}

/// Resolves on Ctrl-C. If the signal cannot be watched the server runs
/// until it is killed.
async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown requested"),
        Err(e) => {
            tracing::error!(error = %e, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    }
}
