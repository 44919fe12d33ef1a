// =============================================================================
// Shared types used across the dashboard engine
// =============================================================================

use serde::{Deserialize, Serialize};

/// A single indicator's opinion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Vote {
    Buy,
    Sell,
    Neutral,
}

impl std::fmt::Display for Vote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "Buy"),
            Self::Sell => write!(f, "Sell"),
            Self::Neutral => write!(f, "Neutral"),
        }
    }
}

/// Discretised recommendation shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    StrongBuy,
    Buy,
    Neutral,
    Sell,
    StrongSell,
}

impl From<Vote> for SentimentLabel {
    fn from(vote: Vote) -> Self {
        match vote {
            Vote::Buy => Self::Buy,
            Vote::Sell => Self::Sell,
            Vote::Neutral => Self::Neutral,
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StrongBuy => write!(f, "Strong Buy"),
            Self::Buy => write!(f, "Buy"),
            Self::Neutral => write!(f, "Neutral"),
            Self::Sell => write!(f, "Sell"),
            Self::StrongSell => write!(f, "Strong Sell"),
        }
    }
}

/// Three-way mood text derived from the RSI vote alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketMood {
    Bullish,
    Neutral,
    Bearish,
}

impl From<Vote> for MarketMood {
    fn from(vote: Vote) -> Self {
        match vote {
            Vote::Buy => Self::Bullish,
            Vote::Sell => Self::Bearish,
            Vote::Neutral => Self::Neutral,
        }
    }
}

impl std::fmt::Display for MarketMood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bullish => write!(f, "Bullish"),
            Self::Neutral => write!(f, "Neutral"),
            Self::Bearish => write!(f, "Bearish"),
        }
    }
}

/// Which RSI formulation to use. The two are not numerically equivalent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RsiStyle {
    /// Zero-change deltas are dropped; the window is the last `period`
    /// non-zero deltas.
    ZeroChangeExcluded,
    /// Plain simple average of gains and losses over the last `period`
    /// deltas, zeros included.
    SimpleAverage,
}

impl Default for RsiStyle {
    fn default() -> Self {
        Self::SimpleAverage
    }
}

impl std::fmt::Display for RsiStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroChangeExcluded => write!(f, "zero_change_excluded"),
            Self::SimpleAverage => write!(f, "simple_average"),
        }
    }
}
