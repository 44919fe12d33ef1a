// =============================================================================
// MACD (Moving Average Convergence Divergence)
// =============================================================================
//
//   MACD line = EMA(fast) - EMA(slow)
//   Signal    = EMA(signal) of the MACD line
//   Histogram = MACD line - Signal
//
// Defaults are (12, 26, 9). The first MACD value exists at close index
// `slow - 1`; the first signal value needs `signal` MACD values on top.
// =============================================================================

use serde::{Deserialize, Serialize};

use super::ema::calculate_ema;

/// Latest MACD triple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdValue {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// MACD line aligned so that element `k` corresponds to close `k + slow - 1`.
///
/// Empty when `fast >= slow`, a period is zero, or history is too short.
pub fn macd_line(closes: &[f64], fast: usize, slow: usize) -> Vec<f64> {
    if fast == 0 || fast >= slow || closes.len() < slow {
        return Vec::new();
    }

    let fast_ema = calculate_ema(closes, fast);
    let slow_ema = calculate_ema(closes, slow);

    // Both series must reach the latest close.
    if fast_ema.len() != closes.len() - fast + 1 || slow_ema.len() != closes.len() - slow + 1 {
        return Vec::new();
    }

    let offset = slow - fast;
    slow_ema
        .iter()
        .enumerate()
        .map(|(k, slow_v)| fast_ema[k + offset] - slow_v)
        .collect()
}

/// Most recent MACD / signal / histogram, or `None` with insufficient history.
pub fn latest_macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Option<MacdValue> {
    if signal == 0 || closes.len() < min_closes(slow, signal) {
        return None;
    }

    let line = macd_line(closes, fast, slow);
    if line.len() < signal {
        return None;
    }

    let signal_series = calculate_ema(&line, signal);
    if signal_series.len() != line.len() - signal + 1 {
        return None;
    }

    let macd = *line.last()?;
    let signal = *signal_series.last()?;
    Some(MacdValue {
        macd,
        signal,
        histogram: macd - signal,
    })
}

/// Minimum number of closes for a defined MACD histogram.
pub fn min_closes(slow: usize, signal: usize) -> usize {
    slow + signal.saturating_sub(1)
}
