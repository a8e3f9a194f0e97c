//! Unified HTTP gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │                  GATEWAY                      │
//!                    │                                               │
//!   Client Request   │  ┌────────┐   ┌─────────┐   ┌─────────────┐  │
//!   ─────────────────┼─▶│  http  │──▶│ routing │──▶│   forward   │──┼──▶ Upstream
//!                    │  │ server │   │ resolve │   │ (deadline)  │  │    Service
//!                    │  └────────┘   └─────────┘   └──────┬──────┘  │
//!                    │                                    │         │
//!   Client Response  │  ┌───────────┐   ┌───────────┐     │         │
//!   ◀────────────────┼──│  error /  │◀──│ transform │◀────┘         │
//!                    │  │  respond  │   │ meta+redact│               │
//!                    │  └───────────┘   └───────────┘                │
//!                    │                                               │
//!                    │  config · registry · admin · observability    │
//!                    └──────────────────────────────────────────────┘
//! ```

use std::path::Path;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use unified_gateway::config::{load_config, GatewayConfig};
use unified_gateway::http::HttpServer;
use unified_gateway::lifecycle::Shutdown;
use unified_gateway::observability::metrics;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "unified_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "unified-gateway starting");

    // Load configuration; defaults serve an empty catalog.
    let config = match std::env::var("GATEWAY_CONFIG") {
        Ok(path) => load_config(Path::new(&path))?,
        Err(_) => {
            tracing::warn!("GATEWAY_CONFIG not set, using defaults (no services registered)");
            GatewayConfig::default()
        }
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        services = config.services.len(),
        upstream_timeout_secs = config.timeouts.upstream_secs,
        "Configuration loaded"
    );

    // Metrics exporter
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // Bind TCP listener
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for connections");

    // Ctrl+C triggers graceful shutdown.
    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.trigger();
        }
    });

    let server = HttpServer::new(config)?;
    server.run(listener, receiver).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
