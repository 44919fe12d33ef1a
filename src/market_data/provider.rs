// =============================================================================
// Market Data Provider — primary / fallback instrument fetch
// =============================================================================
//
// The dashboard asks for spot gold first. If the provider has nothing (empty
// series or a failed request) it retries exactly once against the futures
// contract. If that is also empty the cycle is aborted with
// `EngineError::DataUnavailable`.
// =============================================================================

use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

use super::PriceSeries;
use crate::error::EngineError;

/// Source of historical closes for an instrument.
///
/// An empty series is a valid answer meaning "no data"; `Err` is reserved for
/// transport or decoding failures.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn fetch_series(&self, symbol: &str, range: &str, interval: &str) -> Result<PriceSeries>;
}

/// Fetch `primary`, falling back to `fallback` once when it yields nothing.
pub async fn fetch_with_fallback<P: MarketDataProvider>(
    provider: &P,
    primary: &str,
    fallback: &str,
    range: &str,
    interval: &str,
) -> Result<PriceSeries, EngineError> {
    match provider.fetch_series(primary, range, interval).await {
        Ok(series) if !series.is_empty() => {
            info!(symbol = %primary, samples = series.len(), "primary instrument fetched");
            return Ok(series);
        }
        Ok(_) => warn!(symbol = %primary, fallback = %fallback, "primary instrument returned no data — trying fallback"),
        Err(e) => warn!(symbol = %primary, fallback = %fallback, error = %e, "primary instrument fetch failed — trying fallback"),
    }

    match provider.fetch_series(fallback, range, interval).await {
        Ok(series) if !series.is_empty() => {
            info!(symbol = %fallback, samples = series.len(), "fallback instrument fetched");
            Ok(series)
        }
        Ok(_) => {
            warn!(symbol = %fallback, "fallback instrument returned no data");
            Err(EngineError::DataUnavailable {
                primary: primary.to_string(),
                fallback: fallback.to_string(),
            })
        }
        Err(e) => {
            warn!(symbol = %fallback, error = %e, "fallback instrument fetch failed");
            Err(EngineError::DataUnavailable {
                primary: primary.to_string(),
                fallback: fallback.to_string(),
            })
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;

    use chrono::{TimeZone, Utc};
    use parking_lot::Mutex;

    use super::*;
    use crate::market_data::PricePoint;

    /// In-memory provider: symbols map to closes, `None` means request error.
    #[derive(Default)]
    pub(crate) struct StubProvider {
        pub data: HashMap<String, Option<Vec<f64>>>,
        pub calls: Mutex<Vec<String>>,
    }

    impl StubProvider {
        pub fn with(mut self, symbol: &str, closes: Option<Vec<f64>>) -> Self {
            self.data.insert(symbol.to_string(), closes);
            self
        }
    }

    #[async_trait]
    impl MarketDataProvider for StubProvider {
        async fn fetch_series(&self, symbol: &str, _range: &str, _interval: &str) -> Result<PriceSeries> {
            self.calls.lock().push(symbol.to_string());
            match self.data.get(symbol) {
                Some(Some(closes)) => {
                    let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
                    let points = closes
                        .iter()
                        .enumerate()
                        .map(|(i, c)| PricePoint::new(start + chrono::Duration::hours(i as i64), *c))
                        .collect();
                    PriceSeries::new(symbol, points)
                }
                Some(None) => anyhow::bail!("simulated transport failure for {symbol}"),
                None => Ok(PriceSeries::empty(symbol)),
            }
        }
    }

    #[tokio::test]
    async fn primary_with_data_skips_fallback() {
        let p = StubProvider::default().with("XAUUSD=X", Some(vec![1900.0, 1901.0]));
        let s = fetch_with_fallback(&p, "XAUUSD=X", "GC=F", "1mo", "1h").await.unwrap();
        assert_eq!(s.symbol(), "XAUUSD=X");
        assert_eq!(*p.calls.lock(), vec!["XAUUSD=X"]);
    }

    #[tokio::test]
    async fn empty_primary_falls_back() {
        let p = StubProvider::default().with("GC=F", Some(vec![1910.0, 1912.0]));
        let s = fetch_with_fallback(&p, "XAUUSD=X", "GC=F", "1mo", "1h").await.unwrap();
        assert_eq!(s.symbol(), "GC=F");
        assert_eq!(*p.calls.lock(), vec!["XAUUSD=X", "GC=F"]);
    }

    #[tokio::test]
    async fn failing_primary_falls_back() {
        let p = StubProvider::default()
            .with("XAUUSD=X", None)
            .with("GC=F", Some(vec![1910.0]));
        let s = fetch_with_fallback(&p, "XAUUSD=X", "GC=F", "1mo", "1h").await.unwrap();
        assert_eq!(s.symbol(), "GC=F");
    }

    #[tokio::test]
    async fn both_empty_is_data_unavailable() {
        let p = StubProvider::default();
        let err = fetch_with_fallback(&p, "XAUUSD=X", "GC=F", "1mo", "1h")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::DataUnavailable { .. }));
        // Exactly one retry.
        assert_eq!(p.calls.lock().len(), 2);
    }

    #[tokio::test]
    async fn both_failing_is_data_unavailable() {
        let p = StubProvider::default().with("XAUUSD=X", None).with("GC=F", None);
        let err = fetch_with_fallback(&p, "XAUUSD=X", "GC=F", "1mo", "1h")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::DataUnavailable { ref primary, ref fallback }
            if primary == "XAUUSD=X" && fallback == "GC=F"));
    }
}
