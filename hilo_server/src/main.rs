//! Multi-room card game server using an async actor model.
//!
//! Each room is a RoomActor managed by a RoomRegistry; players connect
//! over websockets and the browser client is served as static files.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Error;
use hilo::RoomRegistry;
use hilo_server::{api, config::ServerConfig, logging, metrics};
use pico_args::Arguments;
use tracing::info;

const HELP: &str = "\
Run a multi-room card game server

USAGE:
  hilo_server [OPTIONS]

OPTIONS:
  --bind          IP:PORT  Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8000]
  --static-dir    PATH     Browser client directory    [default: env STATIC_DIR or public]
  --metrics-bind  IP:PORT  Prometheus scrape address   [default: env METRICS_BIND or disabled]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8000)
  STATIC_DIR               Directory served at the root path
  METRICS_BIND             Prometheus scrape address (disabled when unset)
  ROOM_MIN_PLAYERS         Players required to start a game  [default: 4]
  ROOM_MAX_PLAYERS         Seats per room                    [default: 8]
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind_override: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;
    let static_dir_override: Option<PathBuf> = pargs.opt_value_from_str("--static-dir")?;
    let metrics_bind_override: Option<SocketAddr> = pargs.opt_value_from_str("--metrics-bind")?;

    logging::init();

    let config = ServerConfig::from_env(bind_override, static_dir_override, metrics_bind_override)?;
    config.validate()?;

    if let Some(metrics_bind) = config.metrics_bind {
        metrics::init_metrics(metrics_bind).map_err(Error::msg)?;
        info!("Prometheus metrics exposed at http://{metrics_bind}/metrics");
    }

    let registry = Arc::new(RoomRegistry::new(config.room));
    let state = api::AppState {
        registry: registry.clone(),
    };
    let app = api::create_router(state, &config.static_dir);

    info!(
        "Serving browser client from {}",
        config.static_dir.display()
    );

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!(
        "Shutting down server with {} active room(s)",
        registry.room_count().await
    );

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install CTRL+C signal handler: {e}");
    }
}
