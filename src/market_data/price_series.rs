use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// One closing price sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, close: f64) -> Self {
        Self { timestamp, close }
    }
}

/// Immutable snapshot of recent closes for one instrument.
///
/// Timestamps are strictly increasing and every close is finite. A series is
/// built once per refresh cycle and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a validated series.
    pub fn new(symbol: impl Into<String>, points: Vec<PricePoint>) -> Result<Self> {
        let symbol = symbol.into();

        for (i, p) in points.iter().enumerate() {
            if !p.close.is_finite() {
                bail!("{symbol}: non-finite close at index {i}");
            }
            if i > 0 && p.timestamp <= points[i - 1].timestamp {
                bail!(
                    "{symbol}: timestamps not strictly increasing at index {i} ({} <= {})",
                    p.timestamp,
                    points[i - 1].timestamp
                );
            }
        }

        Ok(Self { symbol, points })
    }

    /// A series with no samples ("provider has no data").
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            points: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// The last `n` samples (all of them when `n >= len`).
    pub fn tail(&self, n: usize) -> &[PricePoint] {
        let points = self.points();
        &points[points.len().saturating_sub(n)..]
    }

    /// Percentage change between the last two closes, rounded to 2 dp.
    ///
    /// `None` with fewer than two samples or a zero previous close.
    pub fn change_pct(&self) -> Option<f64> {
        let [.., prev, last] = self.points.as_slice() else {
            return None;
        };
        if prev.close == 0.0 {
            return None;
        }
        Some(round2((last.close / prev.close - 1.0) * 100.0))
    }
}

/// Round to two decimal places for display.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn hourly(closes: &[f64]) -> Vec<PricePoint> {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, c)| PricePoint::new(start + chrono::Duration::hours(i as i64), *c))
            .collect()
    }

    #[test]
    fn change_pct_one_percent() {
        let s = PriceSeries::new("XAUUSD=X", hourly(&[1900.0, 1919.0])).unwrap();
        assert_eq!(s.change_pct(), Some(1.0));
    }

    #[test]
    fn change_pct_negative_and_rounded() {
        let s = PriceSeries::new("GC=F", hourly(&[2000.0, 1987.123])).unwrap();
        assert_eq!(s.change_pct(), Some(-0.64));
    }

    #[test]
    fn change_pct_needs_two_samples() {
        assert!(PriceSeries::new("GC=F", hourly(&[1900.0])).unwrap().change_pct().is_none());
        assert!(PriceSeries::empty("GC=F").change_pct().is_none());
    }

    #[test]
    fn change_pct_zero_previous_close() {
        let s = PriceSeries::new("GC=F", hourly(&[0.0, 10.0])).unwrap();
        assert!(s.change_pct().is_none());
    }

    #[test]
    fn rejects_non_increasing_timestamps() {
        let mut points = hourly(&[1900.0, 1901.0, 1902.0]);
        points[2].timestamp = points[1].timestamp;
        assert!(PriceSeries::new("GC=F", points).is_err());
    }

    #[test]
    fn rejects_non_finite_close() {
        assert!(PriceSeries::new("GC=F", hourly(&[1900.0, f64::NAN])).is_err());
    }

    #[test]
    fn tail_and_closes() {
        let s = PriceSeries::new("GC=F", hourly(&[1.0, 2.0, 3.0, 4.0])).unwrap();
        assert_eq!(s.closes(), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(s.tail(2).len(), 2);
        assert_eq!(s.tail(2)[0].close, 3.0);
        assert_eq!(s.tail(10).len(), 4);
        assert_eq!(s.last().map(|p| p.close), Some(4.0));
    }
}
