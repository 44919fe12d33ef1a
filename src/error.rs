// =============================================================================
// Domain errors surfaced to the dashboard
// =============================================================================
//
// Only two failure kinds reach the user: market data unavailable (hard stop
// for the cycle) and news feed failure (only the news section is affected).
// Everything else is plumbing and travels as `anyhow::Error`.

use thiserror::Error;

/// Failures that abort indicator computation for a refresh cycle.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Neither instrument produced any samples.
    #[error("no price data for {primary} or fallback {fallback}")]
    DataUnavailable { primary: String, fallback: String },

    /// The engine was handed an empty series.
    #[error("price series for {symbol} is empty")]
    EmptySeries { symbol: String },
}

impl EngineError {
    /// Text shown in place of the market section.
    pub fn user_message(&self) -> &'static str {
        "Failed to fetch data. Try again later."
    }
}

/// Failures fetching or reading the news feed.
#[derive(Debug, Error)]
pub enum NewsError {
    #[error("news request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("news feed returned HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("news feed is not valid XML: {0}")]
    Parse(String),
}

impl NewsError {
    /// Text shown in place of the news section.
    pub fn user_message(&self) -> String {
        format!("Couldn't fetch news feed. Try again later. ({self})")
    }
}
