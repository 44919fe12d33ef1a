// =============================================================================
// Sentiment Aggregation — majority vote over indicator votes
// =============================================================================
//
// Each indicator contributes one vote. The label is decided by vote counts
// against configurable cutoffs, checked in this order:
//
//   buy  >= strong    => Strong Buy
//   buy  >= majority  => Buy
//   sell >= strong    => Strong Sell
//   sell >= majority  => Sell
//   otherwise         => Neutral
//
// bullish_pct = buy * 100 / total (integer division), bearish_pct = 100 - it.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::types::{SentimentLabel, Vote};

/// Vote-count cutoffs for the label decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCutoffs {
    pub strong: usize,
    pub majority: usize,
}

impl Default for VoteCutoffs {
    fn default() -> Self {
        Self {
            strong: 3,
            majority: 2,
        }
    }
}

/// A vote attributed to the indicator that cast it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedVote {
    pub indicator: String,
    pub vote: Vote,
}

impl NamedVote {
    pub fn new(indicator: impl Into<String>, vote: Vote) -> Self {
        Self {
            indicator: indicator.into(),
            vote,
        }
    }
}

/// Result of aggregating the indicator votes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub label: SentimentLabel,
    pub buy_votes: usize,
    pub sell_votes: usize,
    pub neutral_votes: usize,
    pub bullish_pct: u32,
    pub bearish_pct: u32,
    pub votes: Vec<NamedVote>,
}

/// Aggregate `votes` into a [`Sentiment`].
///
/// With no votes at all the label is Neutral and both percentages are 0.
pub fn aggregate_votes(votes: Vec<NamedVote>, cutoffs: &VoteCutoffs) -> Sentiment {
    let count = |kind: Vote| votes.iter().filter(|v| v.vote == kind).count();
    let buy_votes = count(Vote::Buy);
    let sell_votes = count(Vote::Sell);
    let neutral_votes = count(Vote::Neutral);
    let total = votes.len();

    let label = if buy_votes >= cutoffs.strong {
        SentimentLabel::StrongBuy
    } else if buy_votes >= cutoffs.majority {
        SentimentLabel::Buy
    } else if sell_votes >= cutoffs.strong {
        SentimentLabel::StrongSell
    } else if sell_votes >= cutoffs.majority {
        SentimentLabel::Sell
    } else {
        SentimentLabel::Neutral
    };

    let (bullish_pct, bearish_pct) = if total == 0 {
        (0, 0)
    } else {
        let bullish = u32::try_from(buy_votes * 100 / total).unwrap_or(100);
        (bullish, 100 - bullish)
    };

    Sentiment {
        label,
        buy_votes,
        sell_votes,
        neutral_votes,
        bullish_pct,
        bearish_pct,
        votes,
    }
}
