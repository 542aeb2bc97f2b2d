//! Router daemon.
//!
//! # Architecture Overview
//!
//! ```text
//!     Caller                 ┌──────────────────────────────────────────────┐
//!     POST /v1/route ───────▶│  http server ──▶ Router::route                │
//!                            │                     │                        │
//!                            │                     ▼                        │
//!                            │            fallback executor                 │
//!                            │     ┌───────────────┼───────────────┐        │
//!                            │     ▼               ▼               ▼        │
//!                            │  health         rate limit      backend ─────┼──▶ Provider API
//!                            │  tracker        windows         client       │
//!                            │                                              │
//!     GET /admin/status ────▶│  status report / benchmark                   │
//!                            └──────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use backend_router::config::{load_config, RouterConfig};
use backend_router::lifecycle::{signals::shutdown_signal, Shutdown};
use backend_router::observability::{logging, metrics};
use backend_router::{HttpServer, Router};

#[derive(Parser)]
#[command(name = "routerd")]
#[command(about = "Multi-backend request router", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "ROUTER_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => RouterConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "routerd starting");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let router = match Router::from_config(&config) {
        Ok(router) => Arc::new(router),
        Err(e) => {
            tracing::error!(error = %e, "Router failed to start");
            return Err(e.into());
        }
    };
    tracing::info!(
        backends = router.registry().len(),
        attempt_timeout_secs = config.timeouts.attempt_secs,
        "Router initialized"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let shutdown = Shutdown::new();
    let server = HttpServer::new(router, config);
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
