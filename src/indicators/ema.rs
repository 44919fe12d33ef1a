// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
//   multiplier = 2 / (period + 1)
//   EMA_t      = close_t * multiplier + EMA_{t-1} * (1 - multiplier)
//
// Seeded with the SMA of the first `period` values. Used directly for the
// fast/slow crossover vote and as the building block of MACD.
// =============================================================================

/// Compute the EMA series of `values` for look-back `period`.
///
/// Element `i` of the result corresponds to `values[i + period - 1]`.
/// Returns an empty vec when `period == 0` or there are fewer than `period`
/// values. A non-finite value truncates the series at that point.
pub fn calculate_ema(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let multiplier = 2.0 / (period as f64 + 1.0);

    let seed: f64 = values[..period].iter().sum::<f64>() / period as f64;
    if !seed.is_finite() {
        return Vec::new();
    }

    let mut result = Vec::with_capacity(values.len() - period + 1);
    result.push(seed);

    let mut prev = seed;
    for &value in &values[period..] {
        let ema = value * multiplier + prev * (1.0 - multiplier);
        if !ema.is_finite() {
            break;
        }
        result.push(ema);
        prev = ema;
    }

    result
}

/// Most recent EMA value, or `None` with insufficient history.
pub fn latest_ema(values: &[f64], period: usize) -> Option<f64> {
    let series = calculate_ema(values, period);
    // A truncated series does not describe the latest close.
    if series.len() != values.len().saturating_sub(period) + 1 {
        return None;
    }
    series.last().copied()
}
