// =============================================================================
// Signals Module
// =============================================================================
//
// Turns indicator values into votes and votes into a sentiment:
// - Per-indicator threshold rules (RSI, MACD histogram, EMA crossover)
// - Majority-vote aggregation with configurable cutoffs

pub mod sentiment;
pub mod vote;

pub use sentiment::{aggregate_votes, NamedVote, Sentiment, VoteCutoffs};
pub use vote::{ema_cross_vote, macd_vote, threshold_vote, RsiThresholds};
