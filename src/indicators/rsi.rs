// =============================================================================
// Relative Strength Index (RSI)
// =============================================================================
//
//   delta[i] = close[i] - close[i-1]
//   gain[i]  = max(delta[i], 0),  loss[i] = max(-delta[i], 0)
//   RS       = avg_gain / avg_loss
//   RSI      = 100 - 100 / (1 + RS)
//
// Two window selections are supported and never mixed:
//
//   SimpleAverage:      the last `period` deltas, zero changes included.
//   ZeroChangeExcluded: the last `period` deltas, undefined if any of them
//                       is zero. The window never extends past them.
//
// avg_loss == 0 saturates to 100. avg_gain == avg_loss == 0 is undefined.
// =============================================================================

use crate::types::RsiStyle;

/// RSI value for every close, aligned with `closes`.
///
/// Entries without enough history (or with an undefined ratio) are `None`.
pub fn rsi_series(closes: &[f64], period: usize, style: RsiStyle) -> Vec<Option<f64>> {
    if period == 0 || closes.is_empty() {
        return vec![None; closes.len()];
    }

    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();

    // Close `i` is described by deltas[..i].
    (0..closes.len())
        .map(|i| match style {
            RsiStyle::SimpleAverage => simple_average_at(&deltas[..i], period),
            RsiStyle::ZeroChangeExcluded => zero_change_excluded_at(&deltas[..i], period),
        })
        .collect()
}

/// Most recent RSI value, or `None` when it is undefined.
pub fn latest_rsi(closes: &[f64], period: usize, style: RsiStyle) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }
    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    match style {
        RsiStyle::SimpleAverage => simple_average_at(&deltas, period),
        RsiStyle::ZeroChangeExcluded => zero_change_excluded_at(&deltas, period),
    }
}

// =============================================================================
// Internal helpers
// =============================================================================

fn simple_average_at(deltas: &[f64], period: usize) -> Option<f64> {
    if deltas.len() < period {
        return None;
    }
    let window = &deltas[deltas.len() - period..];
    let (gain, loss) = split_sums(window.iter().copied());
    rsi_from_averages(gain / period as f64, loss / period as f64)
}

fn zero_change_excluded_at(deltas: &[f64], period: usize) -> Option<f64> {
    if deltas.len() < period {
        return None;
    }
    let window = &deltas[deltas.len() - period..];
    // A flat candle leaves a hole in the window.
    if window.iter().any(|d| *d == 0.0) {
        return None;
    }
    let (gain, loss) = split_sums(window.iter().copied());
    rsi_from_averages(gain / period as f64, loss / period as f64)
}

fn split_sums(deltas: impl Iterator<Item = f64>) -> (f64, f64) {
    deltas.fold((0.0_f64, 0.0_f64), |(g, l), d| {
        if d > 0.0 {
            (g + d, l)
        } else {
            (g, l - d)
        }
    })
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        return None;
    }

    let rsi = if avg_loss == 0.0 {
        100.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    };

    rsi.is_finite().then_some(rsi)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn ascending(n: usize) -> Vec<f64> {
        (0..n).map(|x| 1900.0 + x as f64).collect()
    }

    fn descending(n: usize) -> Vec<f64> {
        (0..n).map(|x| 1900.0 - x as f64).collect()
    }

    // ---- latest_rsi ------------------------------------------------------

    #[test]
    fn rsi_needs_period_plus_one_closes() {
        assert!(latest_rsi(&ascending(14), 14, RsiStyle::SimpleAverage).is_none());
        assert!(latest_rsi(&ascending(15), 14, RsiStyle::SimpleAverage).is_some());
    }

    #[test]
    fn rsi_period_zero_is_undefined() {
        assert!(latest_rsi(&ascending(30), 0, RsiStyle::SimpleAverage).is_none());
        assert!(rsi_series(&ascending(5), 0, RsiStyle::SimpleAverage)
            .iter()
            .all(Option::is_none));
    }

    #[test]
    fn rsi_strictly_increasing_saturates_to_100() {
        for style in [RsiStyle::SimpleAverage, RsiStyle::ZeroChangeExcluded] {
            let v = latest_rsi(&ascending(40), 14, style).unwrap();
            assert!((v - 100.0).abs() < 1e-10, "{style}: expected 100, got {v}");
        }
    }

    #[test]
    fn rsi_strictly_decreasing_goes_to_0() {
        for style in [RsiStyle::SimpleAverage, RsiStyle::ZeroChangeExcluded] {
            let v = latest_rsi(&descending(40), 14, style).unwrap();
            assert!(v.abs() < 1e-10, "{style}: expected 0, got {v}");
        }
    }

    #[test]
    fn constant_series_is_undefined_in_simple_average() {
        // Every delta is zero: avg_gain / avg_loss = 0 / 0.
        let closes = vec![1900.0; 30];
        assert!(latest_rsi(&closes, 14, RsiStyle::SimpleAverage).is_none());
        assert!(rsi_series(&closes, 14, RsiStyle::SimpleAverage)
            .iter()
            .all(Option::is_none));
    }

    #[test]
    fn constant_series_is_excluded_in_zero_change_style() {
        // Every window holds a zero delta.
        let closes = vec![1900.0; 30];
        assert!(latest_rsi(&closes, 14, RsiStyle::ZeroChangeExcluded).is_none());
    }

    #[test]
    fn flat_candle_in_window_is_undefined_in_zero_change_style() {
        // 20 rising hours, one flat hour, two more rising hours.
        let mut closes = ascending(20);
        closes.push(*closes.last().unwrap());
        closes.push(closes.last().unwrap() + 1.0);
        closes.push(closes.last().unwrap() + 1.0);

        assert!(latest_rsi(&closes, 14, RsiStyle::ZeroChangeExcluded).is_none());
        // Simple average keeps the zero in the window and stays defined.
        let simple = latest_rsi(&closes, 14, RsiStyle::SimpleAverage).unwrap();
        assert!((simple - 100.0).abs() < 1e-10);
    }

    #[test]
    fn flat_candle_leaving_window_restores_zero_change_style() {
        // deltas: 0, +1, -1 with period 2: the zero is outside the window.
        let closes = [10.0, 10.0, 11.0, 10.0];
        let v = latest_rsi(&closes, 2, RsiStyle::ZeroChangeExcluded).unwrap();
        assert!((v - 50.0).abs() < 1e-10);

        let series = rsi_series(&closes, 2, RsiStyle::ZeroChangeExcluded);
        // Close 2 sees deltas [0, +1]: the zero is inside the window.
        assert_eq!(series[2], None);
        assert_eq!(series[3], Some(v));
    }

    #[test]
    fn simple_average_matches_hand_computation() {
        // deltas: +2, -1, +1 with period 3: gain 3/3, loss 1/3, RS = 3.
        let closes = [100.0, 102.0, 101.0, 102.0];
        let v = latest_rsi(&closes, 3, RsiStyle::SimpleAverage).unwrap();
        assert!((v - 75.0).abs() < 1e-10);
    }

    #[test]
    fn rsi_range_check() {
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
            44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        for style in [RsiStyle::SimpleAverage, RsiStyle::ZeroChangeExcluded] {
            for v in rsi_series(&closes, 14, style).into_iter().flatten() {
                assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
            }
        }
    }

    // ---- rsi_series ------------------------------------------------------

    #[test]
    fn series_is_aligned_with_closes() {
        let closes = ascending(20);
        let series = rsi_series(&closes, 14, RsiStyle::SimpleAverage);
        assert_eq!(series.len(), closes.len());
        assert!(series[..14].iter().all(Option::is_none));
        assert!(series[14..].iter().all(Option::is_some));
    }

    #[test]
    fn series_last_matches_latest() {
        let closes = vec![
            1901.2, 1903.5, 1902.0, 1899.8, 1904.1, 1906.3, 1905.0, 1907.7, 1908.2, 1906.9,
            1909.4, 1911.0, 1910.2, 1912.8, 1913.1, 1911.5, 1914.0,
        ];
        for style in [RsiStyle::SimpleAverage, RsiStyle::ZeroChangeExcluded] {
            let series = rsi_series(&closes, 14, style);
            assert_eq!(*series.last().unwrap(), latest_rsi(&closes, 14, style));
        }
    }
}
