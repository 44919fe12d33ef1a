// =============================================================================
// Aurum Gold Dashboard — Main Entry Point
// =============================================================================
//
// Two long-running tasks share one `AppState`: the refresh loop (fetch,
// evaluate, publish) and the HTTP server. Ctrl+C exits; the config file is
// only ever read.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod engine;
mod error;
mod indicators;
mod market_data;
mod news;
mod refresh;
mod runtime_config;
mod signals;
mod types;

use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::market_data::YahooChartClient;
use crate::news::NewsClient;
use crate::runtime_config::RuntimeConfig;

const DEFAULT_CONFIG_PATH: &str = "runtime_config.json";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3001";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║        Aurum Gold Dashboard — Starting Up                ║");
    info!("╚══════════════════════════════════════════════════════════╝");

    let config_path =
        std::env::var("GOLD_CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());

    let mut config = RuntimeConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, path = %config_path, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });
    config.apply_env_overrides();
    config.validate().context("runtime config invalid after env overrides")?;

    info!(
        primary = %config.primary_symbol,
        fallback = %config.fallback_symbol,
        range = %config.history_range,
        interval = %config.bar_interval,
        refresh_secs = config.refresh_interval_secs,
        rsi_style = %config.engine.rsi_style,
        "Dashboard configured"
    );

    // ── 2. Clients ───────────────────────────────────────────────────────
    let provider = YahooChartClient::new()?;
    let news = NewsClient::new(config.news_feed_url.clone())?;
    info!(feed = %news.feed_url(), limit = config.news_limit, "News feed configured");

    // ── 3. Shared state ──────────────────────────────────────────────────
    let state = Arc::new(AppState::new(config));

    // ── 4. Refresh loop ──────────────────────────────────────────────────
    tokio::spawn(refresh::run_refresh_loop(state.clone(), provider, news));

    // ── 5. API server ────────────────────────────────────────────────────
    let bind_addr = std::env::var("GOLD_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.into());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server on {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening");

    let app = api::rest::router(state.clone());
    let server = tokio::spawn(async move { axum::serve(listener, app).await });

    info!("All subsystems running. Press Ctrl+C to stop.");

    // ── 6. Graceful shutdown ─────────────────────────────────────────────
    tokio::select! {
        res = tokio::signal::ctrl_c() => {
            res.context("failed to listen for shutdown signal")?;
            warn!("Shutdown signal received — stopping gracefully");
        }
        res = server => {
            match res {
                Ok(Ok(())) => warn!("API server exited"),
                Ok(Err(e)) => error!(error = %e, "API server failed"),
                Err(e) => error!(error = %e, "API server task panicked"),
            }
        }
    }

    info!("Aurum Gold Dashboard shut down complete.");
    Ok(())
}
