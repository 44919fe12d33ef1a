// =============================================================================
// Yahoo Finance Chart Client — hourly closes over HTTP
// =============================================================================
//
// GET {base}/v8/finance/chart/{symbol}?range=1mo&interval=1h
//
// Yahoo answers "no data" either with an empty `result`, a result without a
// `timestamp` array, or a `chart.error` object. All three map to an empty
// series so the caller can fall back to the secondary instrument.
// =============================================================================

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::provider::MarketDataProvider;
use super::{PricePoint, PriceSeries};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// HTTP client for the Yahoo Finance v8 chart endpoint.
#[derive(Clone)]
pub struct YahooChartClient {
    base_url: String,
    client: reqwest::Client,
}

impl YahooChartClient {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the client at a different host (mirrors, local test servers).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));

        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("failed to build market data HTTP client")?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(base_url = %base_url, "YahooChartClient initialised");

        Ok(Self { base_url, client })
    }
}

#[async_trait]
impl MarketDataProvider for YahooChartClient {
    #[instrument(skip(self), name = "yahoo::fetch_series")]
    async fn fetch_series(&self, symbol: &str, range: &str, interval: &str) -> Result<PriceSeries> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);

        let resp = self
            .client
            .get(&url)
            .query(&[("range", range), ("interval", interval)])
            .send()
            .await
            .with_context(|| format!("GET chart for {symbol} failed"))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .with_context(|| format!("failed to read chart body for {symbol}"))?;

        // Yahoo returns 404 with a `chart.error` body for unknown symbols.
        if !status.is_success() && status != reqwest::StatusCode::NOT_FOUND {
            anyhow::bail!("Yahoo chart for {symbol} returned {status}");
        }

        let series = parse_chart_response(symbol, &body)?;
        debug!(symbol, samples = series.len(), "chart parsed");
        Ok(series)
    }
}

// =============================================================================
// Response decoding
// =============================================================================

#[derive(Deserialize, Debug)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Deserialize, Debug)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Deserialize, Debug)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Deserialize, Debug)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Decode a v8 chart payload into a [`PriceSeries`].
///
/// Null closes are skipped, as are samples whose timestamp does not advance
/// past the previous kept sample.
pub fn parse_chart_response(symbol: &str, body: &str) -> Result<PriceSeries> {
    let parsed: ChartResponse = serde_json::from_str(body)
        .with_context(|| format!("failed to parse chart response for {symbol}"))?;

    if let Some(err) = parsed.chart.error {
        warn!(
            symbol,
            code = err.code.as_deref().unwrap_or(""),
            description = err.description.as_deref().unwrap_or(""),
            "chart endpoint reported an error — treating as no data"
        );
        return Ok(PriceSeries::empty(symbol));
    }

    let Some(result) = parsed.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(PriceSeries::empty(symbol));
    };
    let Some(quote) = result.indicators.quote.into_iter().next() else {
        return Ok(PriceSeries::empty(symbol));
    };

    let mut points: Vec<PricePoint> = Vec::with_capacity(result.timestamp.len());
    for (ts, close) in result.timestamp.iter().zip(quote.close) {
        let Some(close) = close.filter(|c| c.is_finite()) else {
            continue;
        };
        let Some(timestamp) = DateTime::<Utc>::from_timestamp(*ts, 0) else {
            continue;
        };
        if points.last().is_some_and(|p| p.timestamp >= timestamp) {
            continue;
        }
        points.push(PricePoint::new(timestamp, close));
    }

    PriceSeries::new(symbol, points)
}
