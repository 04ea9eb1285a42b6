//! tracklink-server - cross-catalog track equivalence service
//!
//! Paste a Spotify or Deezer track/playlist link, get the equivalent on the
//! other catalog. Serves plain request/response endpoints and a WebSocket
//! session protocol.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use tracklink_common::config::Config;
use tracklink_server::{build_router, db, AppState};

#[derive(Parser, Debug)]
#[command(name = "tracklink-server", about = "Cross-catalog track equivalence service")]
struct Args {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 13200)]
    port: u16,

    /// SQLite store path (cache, counters, stored users)
    #[arg(long, env = "DATABASE_PATH", default_value = "tracklink.db")]
    database: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env first so clap's env fallbacks and Config::from_env both see it
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting tracklink-server v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let config = Config::from_env()?;

    let pool = db::connect(&args.database).await?;
    let state = AppState::new(pool, config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", args.port)).await?;
    info!("tracklink-server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
