// =============================================================================
// Indicator Votes — threshold rules per indicator
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::types::Vote;

/// Oversold / overbought bounds for the RSI threshold rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsiThresholds {
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for RsiThresholds {
    fn default() -> Self {
        Self {
            oversold: 30.0,
            overbought: 70.0,
        }
    }
}

/// RSI threshold rule. Strict on both sides: exactly `oversold` or exactly
/// `overbought` is neutral.
///
/// This is the single rule behind both the summary label and the market mood.
pub fn threshold_vote(rsi: f64, thresholds: &RsiThresholds) -> Vote {
    if rsi < thresholds.oversold {
        Vote::Buy
    } else if rsi > thresholds.overbought {
        Vote::Sell
    } else {
        Vote::Neutral
    }
}

/// MACD histogram vote. Binary: anything not above zero is a sell.
pub fn macd_vote(histogram: f64) -> Vote {
    if histogram > 0.0 {
        Vote::Buy
    } else {
        Vote::Sell
    }
}

/// Fast/slow EMA crossover vote. Binary: equal EMAs count as a sell.
pub fn ema_cross_vote(fast: f64, slow: f64) -> Vote {
    if fast > slow {
        Vote::Buy
    } else {
        Vote::Sell
    }
}
