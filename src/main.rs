// =============================================================================
// Coin Pro Signal — Main Entry Point
// =============================================================================
//
// Fetches candles for the selected market on a fixed cadence, computes the
// RSI / Bollinger indicator frame and the composite signal, and serves the
// latest evaluation over HTTP for a charting front-end.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod evaluation;
mod indicators;
mod market_data;
mod refresh;
mod runtime_config;
mod signals;
mod types;

use anyhow::Context;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::market_data::upbit::{UpbitClient, DEFAULT_BASE_URL};
use crate::runtime_config::{RuntimeConfig, CONFIG_PATH};
use crate::types::Market;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Coin Pro Signal — starting up");

    let config = RuntimeConfig::load(CONFIG_PATH).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });

    // ── 2. Market data client & shared state ─────────────────────────────
    let base_url =
        std::env::var("PRO_CHART_UPBIT_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
    let upbit = UpbitClient::new(base_url)?;

    let state = Arc::new(AppState::new(config, upbit, CONFIG_PATH));

    // Env override applies to this process only; it is never saved.
    if let Ok(code) = std::env::var("PRO_CHART_MARKET") {
        let market = Market::parse(&code).context("invalid PRO_CHART_MARKET")?;
        state.apply_market_override(market);
    }

    {
        let config = state.runtime_config.read();
        info!(
            market = %config.market,
            interval = %config.interval,
            candle_count = config.candle_count,
            refresh_secs = config.refresh_secs,
            "Configured market"
        );
    }

    // ── 3. API server ────────────────────────────────────────────────────
    let bind_addr =
        std::env::var("PRO_CHART_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".into());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, "API server listening");

    let app = api::rest::router(state.clone());
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "API server failed");
        }
    });

    // ── 4. Refresh loop ──────────────────────────────────────────────────
    tokio::spawn(refresh::run_refresh_loop(state.clone()));

    info!("All subsystems running. Press Ctrl+C to stop.");

    // ── 5. Graceful shutdown ─────────────────────────────────────────────
    tokio::signal::ctrl_c().await?;
    warn!("Shutdown signal received — stopping gracefully");

    info!("Coin Pro Signal shut down complete.");
    Ok(())
}
