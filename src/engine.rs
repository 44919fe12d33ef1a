// =============================================================================
// Indicator & Sentiment Engine
// =============================================================================
//
// A pure function of (PriceSeries, EngineConfig). Every call recomputes all
// indicators from the raw closes; nothing is carried between calls.
//
// Pipeline:
//   1. Reject an empty series (hard stop for the cycle).
//   2. RSI (configured style), EMA fast / slow, MACD.
//   3. RSI threshold vote  => summary label + market mood.
//   4. RSI + MACD + EMA-cross votes => aggregated sentiment (when enabled).
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EngineError;
use crate::indicators::{latest_ema, latest_macd, latest_rsi, rsi_series, MacdValue};
use crate::market_data::{round2, PriceSeries};
use crate::signals::{
    aggregate_votes, ema_cross_vote, macd_vote, threshold_vote, NamedVote, RsiThresholds,
    Sentiment, VoteCutoffs,
};
use crate::types::{MarketMood, RsiStyle, SentimentLabel};

// =============================================================================
// Configuration
// =============================================================================

fn default_rsi_period() -> usize {
    14
}

fn default_macd_fast() -> usize {
    12
}

fn default_macd_slow() -> usize {
    26
}

fn default_macd_signal() -> usize {
    9
}

fn default_true() -> bool {
    true
}

fn default_chart_points() -> usize {
    168
}

/// Tunables for the engine. Every field has a serde default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    /// Which RSI formulation to use.
    #[serde(default)]
    pub rsi_style: RsiStyle,

    #[serde(default)]
    pub rsi_thresholds: RsiThresholds,

    #[serde(default = "default_macd_fast")]
    pub macd_fast: usize,

    #[serde(default = "default_macd_slow")]
    pub macd_slow: usize,

    #[serde(default = "default_macd_signal")]
    pub macd_signal: usize,

    #[serde(default)]
    pub vote_cutoffs: VoteCutoffs,

    /// Add MACD and EMA-crossover votes and publish the aggregated sentiment.
    #[serde(default = "default_true")]
    pub trend_votes: bool,

    /// Number of trailing samples kept for the line chart.
    #[serde(default = "default_chart_points")]
    pub chart_points: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rsi_period: default_rsi_period(),
            rsi_style: RsiStyle::default(),
            rsi_thresholds: RsiThresholds::default(),
            macd_fast: default_macd_fast(),
            macd_slow: default_macd_slow(),
            macd_signal: default_macd_signal(),
            vote_cutoffs: VoteCutoffs::default(),
            trend_votes: true,
            chart_points: default_chart_points(),
        }
    }
}

impl EngineConfig {
    /// Reject combinations the engine cannot compute with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.rsi_period == 0 || self.macd_fast == 0 || self.macd_signal == 0 {
            anyhow::bail!("indicator periods must be > 0");
        }
        if self.macd_fast >= self.macd_slow {
            anyhow::bail!(
                "macd_fast ({}) must be below macd_slow ({})",
                self.macd_fast,
                self.macd_slow
            );
        }
        let t = &self.rsi_thresholds;
        if t.oversold >= t.overbought {
            anyhow::bail!(
                "rsi oversold ({}) must be below overbought ({})",
                t.oversold,
                t.overbought
            );
        }
        let c = &self.vote_cutoffs;
        if c.majority == 0 || c.majority > c.strong {
            anyhow::bail!(
                "vote cutoffs must satisfy 0 < majority ({}) <= strong ({})",
                c.majority,
                c.strong
            );
        }
        Ok(())
    }
}

// =============================================================================
// Output
// =============================================================================

/// Indicator values for the latest close. `None` means undefined.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub rsi: Option<f64>,
    pub macd: Option<MacdValue>,
    pub macd_histogram: Option<f64>,
    pub ema_fast: Option<f64>,
    pub ema_slow: Option<f64>,
}

/// One point of the close / RSI line chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    pub rsi: Option<f64>,
}

/// Everything derived from one price series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketReport {
    pub symbol: String,
    pub last_price: f64,
    pub last_timestamp: DateTime<Utc>,
    /// Change between the last two closes in percent, 2 dp.
    pub change_pct: Option<f64>,
    pub rsi_style: RsiStyle,
    pub indicators: IndicatorSet,
    /// RSI threshold rule as a Buy / Sell / Neutral label.
    pub summary: Option<SentimentLabel>,
    /// The same rule as Bullish / Bearish / Neutral.
    pub mood: Option<MarketMood>,
    /// Multi-indicator vote, present when trend votes are enabled.
    pub sentiment: Option<Sentiment>,
    pub chart: Vec<ChartPoint>,
}

// =============================================================================
// Evaluation
// =============================================================================

/// Run the engine over `series`.
pub fn evaluate(series: &PriceSeries, config: &EngineConfig) -> Result<MarketReport, EngineError> {
    let Some(last) = series.last() else {
        return Err(EngineError::EmptySeries {
            symbol: series.symbol().to_string(),
        });
    };

    let closes = series.closes();

    let rsi = latest_rsi(&closes, config.rsi_period, config.rsi_style);
    let macd = latest_macd(&closes, config.macd_fast, config.macd_slow, config.macd_signal);
    let ema_fast = latest_ema(&closes, config.macd_fast);
    let ema_slow = latest_ema(&closes, config.macd_slow);

    let indicators = IndicatorSet {
        rsi,
        macd,
        macd_histogram: macd.map(|m| m.histogram),
        ema_fast,
        ema_slow,
    };

    let rsi_vote = rsi.map(|v| threshold_vote(v, &config.rsi_thresholds));
    let summary = rsi_vote.map(SentimentLabel::from);
    let mood = rsi_vote.map(MarketMood::from);

    let sentiment = config.trend_votes.then(|| {
        let mut votes = Vec::with_capacity(3);
        if let Some(v) = rsi_vote {
            votes.push(NamedVote::new("rsi", v));
        }
        if let Some(h) = indicators.macd_histogram {
            votes.push(NamedVote::new("macd", macd_vote(h)));
        }
        if let (Some(fast), Some(slow)) = (ema_fast, ema_slow) {
            votes.push(NamedVote::new("ema_cross", ema_cross_vote(fast, slow)));
        }
        aggregate_votes(votes, &config.vote_cutoffs)
    });

    let chart = chart_points(series, &closes, config);

    debug!(
        symbol = series.symbol(),
        samples = series.len(),
        rsi = ?rsi,
        histogram = ?indicators.macd_histogram,
        "engine evaluated series"
    );

    Ok(MarketReport {
        symbol: series.symbol().to_string(),
        last_price: round2(last.close),
        last_timestamp: last.timestamp,
        change_pct: series.change_pct(),
        rsi_style: config.rsi_style,
        indicators,
        summary,
        mood,
        sentiment,
        chart,
    })
}

fn chart_points(series: &PriceSeries, closes: &[f64], config: &EngineConfig) -> Vec<ChartPoint> {
    let rsi = rsi_series(closes, config.rsi_period, config.rsi_style);
    let start = series.len().saturating_sub(config.chart_points);
    series
        .tail(config.chart_points)
        .iter()
        .zip(&rsi[start..])
        .map(|(p, rsi)| ChartPoint {
            timestamp: p.timestamp,
            close: p.close,
            rsi: *rsi,
        })
        .collect()
}
