// =============================================================================
// Refresh Pipeline — fetch, evaluate, publish
// =============================================================================
//
// One cycle: fetch the price series (primary, then fallback once), run the
// engine, fetch headlines, publish a `DashboardSnapshot` into `AppState`.
// Market and news failures are independent: either can fail without hiding
// the other section.
//
// Only `run_refresh_loop` runs cycles. Manual refresh requests wake the loop
// through `AppState::refresh_requested`, so two cycles never overlap.
// =============================================================================

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::app_state::{AppState, DashboardSnapshot};
use crate::engine;
use crate::market_data::{fetch_with_fallback, MarketDataProvider};
use crate::news::NewsSource;

/// Run one refresh cycle and publish its result. Returns the published
/// snapshot.
pub async fn run_refresh_cycle<P, N>(state: &AppState, provider: &P, news: &N) -> DashboardSnapshot
where
    P: MarketDataProvider,
    N: NewsSource,
{
    let cycle_id = Uuid::new_v4();
    let span = info_span!("refresh_cycle", cycle_id = %cycle_id);

    async move {
        // Never hold the config lock across an await.
        let config = state.runtime_config.read().clone();

        // ── Market ──────────────────────────────────────────────────
        let mut snapshot = DashboardSnapshot {
            cycle_id,
            state_version: 0,
            generated_at: Utc::now(),
            refresh_interval_secs: config.refresh_interval_secs,
            symbol_used: None,
            served_by_fallback: false,
            market: None,
            market_error: None,
            news: Vec::new(),
            news_error: None,
            chart_widget_url: None,
        };

        let fetched = fetch_with_fallback(
            provider,
            &config.primary_symbol,
            &config.fallback_symbol,
            &config.history_range,
            &config.bar_interval,
        )
        .await;

        match fetched.and_then(|series| engine::evaluate(&series, &config.engine)) {
            Ok(report) => {
                snapshot.served_by_fallback = report.symbol == config.fallback_symbol;
                snapshot.symbol_used = Some(report.symbol.clone());
                info!(
                    symbol = %report.symbol,
                    price = report.last_price,
                    rsi = ?report.indicators.rsi,
                    summary = ?report.summary,
                    "market evaluated"
                );
                snapshot.market = Some(report);
            }
            Err(e) => {
                error!(error = %e, "market data unavailable");
                let message = e.user_message().to_string();
                state.push_error("market", message.clone(), Some(e.to_string()), Some(cycle_id));
                snapshot.market_error = Some(message);
            }
        }

        // ── News ────────────────────────────────────────────────────
        match news.fetch_headlines(config.news_limit).await {
            Ok(items) => {
                info!(count = items.len(), "headlines fetched");
                snapshot.news = items;
            }
            Err(e) => {
                warn!(error = %e, "news feed unavailable");
                let message = e.user_message();
                state.push_error("news", message.clone(), Some(e.to_string()), Some(cycle_id));
                snapshot.news_error = Some(message);
            }
        }

        // ── Chart widget ────────────────────────────────────────────
        match config.chart_widget_url() {
            Ok(url) => snapshot.chart_widget_url = Some(url),
            Err(e) => warn!(error = %e, "chart widget URL unavailable"),
        }

        let version = state.publish(snapshot.clone());
        snapshot.state_version = version;
        info!(state_version = version, "snapshot published");
        snapshot
    }
    .instrument(span)
    .await
}

/// Run cycles forever: once immediately, then every `refresh_interval_secs`,
/// and whenever a manual refresh is requested.
pub async fn run_refresh_loop<P, N>(state: Arc<AppState>, provider: P, news: N)
where
    P: MarketDataProvider,
    N: NewsSource,
{
    let secs = state.runtime_config.read().refresh_interval_secs.max(1);
    let mut interval = tokio::time::interval(Duration::from_secs(secs));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(refresh_secs = secs, "refresh loop starting");

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = state.refresh_requested.notified() => {
                info!("manual refresh requested");
                interval.reset();
            }
        }

        run_refresh_cycle(&state, &provider, &news).await;
    }
}
