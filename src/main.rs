//! # Stockdash: Stock Market Dashboard Backend
//!
//! ```text
//!                      ┌──────────────────────────────────────┐
//!  every TICK_INTERVAL │ AppState                             │
//!  ┌──────────────┐    │ ├─ market      (RwLock<MarketTable>) │
//!  │  Price feed  │──▶ │ ├─ predictions                       │
//!  │  (mutator)   │    │ ├─ broadcaster ──────────────────┐   │
//!  └──────────────┘    │ └─ rate_limiter                  │   │
//!                      └──────────────────────────────────┼───┘
//!  ┌──────────────┐  GET /api/*  (read-only)              │
//!  │  Dashboard   │ ─────────────────────────▶            │
//!  │              │  ws://host/ws  ◀─────────────────────── ┘  priceUpdate
//!  └──────────────┘
//! ```
//!
//! Configuration comes from the environment (optionally a `.env` file); see
//! [`config::AppConfig`] for every variable and its default.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod engine;
mod error;
mod events;
mod market;
mod models;
mod rate_limit;
mod routes;
mod state;

use config::AppConfig;
use engine::feed::spawn_price_feed;
use routes::build_router;
use state::build_state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Load .env ──────────────────────────────────────────────────────────
    dotenvy::dotenv().ok();

    // ── 2. Structured logging ─────────────────────────────────────────────────
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive("stockdash=debug".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    info!(r#"

  ╔═══════════════════════════════════════════════════════╗
  ║        STOCKDASH · Market Dashboard Backend           ║
  ║  Quotes · History · Predictions · Live Price Feed     ║
  ╚═══════════════════════════════════════════════════════╝"#);

    // ── 3. Config & shared state ──────────────────────────────────────────────
    let config = AppConfig::from_env().context("failed to load configuration")?;
    let addr = config.bind_addr;
    info!(
        environment = %config.environment,
        tick_ms = config.tick_interval.as_millis() as u64,
        window = config.history_window,
        "⚙️  Configuration loaded"
    );

    let state = build_state(config);
    info!(symbols = state.market.read().await.len(), "🌱 Market seeded");

    // ── 4. Price feed ─────────────────────────────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let feed = spawn_price_feed(state.clone(), shutdown_rx);

    // ── 5. Router ─────────────────────────────────────────────────────────────
    let app = build_router(state);

    // ── 6. Bind & Serve ───────────────────────────────────────────────────────
    info!(?addr, "🚀 Stockdash server starting");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await?;

    if let Err(err) = feed.await {
        error!(%err, "Price feed task failed");
    }
    info!("👋 Server stopped");

    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM, then tell the price feed to stop.
async fn shutdown_signal(shutdown_tx: watch::Sender<bool>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(%err, "Ctrl+C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(%err, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }

    let _ = shutdown_tx.send(true);
}
