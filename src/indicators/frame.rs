// =============================================================================
// Indicator Frame — aligned oscillator + envelope for a whole bar series
// =============================================================================

use serde::Serialize;

use super::bollinger::{calculate_bollinger, BOLLINGER_NUM_STD, BOLLINGER_PERIOD};
use super::rsi::{calculate_rsi, RSI_PERIOD};
use crate::types::BarSeries;

/// Per-bar indicator values, one entry per input bar.
///
/// `None` marks an entry with no value: either the window had insufficient
/// history or (oscillator only) the gain/loss ratio was 0/0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorFrame {
    pub oscillator: Vec<Option<f64>>,
    pub center: Vec<Option<f64>>,
    pub upper: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

/// Indicator values at a single index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorPoint {
    pub oscillator: Option<f64>,
    pub center: Option<f64>,
    pub upper: Option<f64>,
    pub lower: Option<f64>,
}

/// Compute the full frame from scratch.  No state is kept between calls.
pub fn compute(series: &BarSeries) -> IndicatorFrame {
    let closes = series.closes();
    let bands = calculate_bollinger(&closes, BOLLINGER_PERIOD, BOLLINGER_NUM_STD);

    IndicatorFrame {
        oscillator: calculate_rsi(&closes, RSI_PERIOD),
        center: bands.center,
        upper: bands.upper,
        lower: bands.lower,
    }
}

impl IndicatorFrame {
    pub fn len(&self) -> usize {
        self.oscillator.len()
    }

    pub fn at(&self, index: usize) -> Option<IndicatorPoint> {
        Some(IndicatorPoint {
            oscillator: *self.oscillator.get(index)?,
            center: *self.center.get(index)?,
            upper: *self.upper.get(index)?,
            lower: *self.lower.get(index)?,
        })
    }

    /// Values at the newest bar.
    pub fn latest(&self) -> Option<IndicatorPoint> {
        self.at(self.len().checked_sub(1)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::test_support::series_from_closes;

    fn wave(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 200.0 + (i as f64 * 0.45).sin() * 12.0 + (i as f64 * 0.1).cos() * 3.0)
            .collect()
    }

    #[test]
    fn frame_is_aligned_with_series() {
        let series = series_from_closes(&wave(50));
        let frame = compute(&series);
        assert_eq!(frame.len(), 50);
        assert_eq!(frame.center.len(), 50);
        assert_eq!(frame.upper.len(), 50);
        assert_eq!(frame.lower.len(), 50);
    }

    #[test]
    fn warm_up_boundaries() {
        let frame = compute(&series_from_closes(&wave(40)));
        assert!(frame.oscillator[..13].iter().all(Option::is_none));
        assert!(frame.oscillator[13].is_some());
        assert!(frame.center[..19].iter().all(Option::is_none));
        assert!(frame.center[19].is_some());
        assert!(frame.upper[19].is_some());
        assert!(frame.lower[19].is_some());
    }

    #[test]
    fn short_series_is_entirely_undefined() {
        let frame = compute(&series_from_closes(&wave(13)));
        assert!(frame.oscillator.iter().all(Option::is_none));
        assert!(frame.center.iter().all(Option::is_none));

        let frame = compute(&series_from_closes(&wave(19)));
        assert!(frame.center.iter().all(Option::is_none));
        assert!(frame.upper.iter().all(Option::is_none));
        assert!(frame.lower.iter().all(Option::is_none));
    }

    #[test]
    fn center_is_trailing_mean_of_closes() {
        let closes = wave(45);
        let frame = compute(&series_from_closes(&closes));
        for i in 19..closes.len() {
            let expected = closes[i - 19..=i].iter().sum::<f64>() / 20.0;
            assert!((frame.center[i].unwrap() - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn rising_tail_gives_100_and_falling_tail_gives_0() {
        let mut closes = wave(30);
        let base = closes[29];
        closes.extend((1..=14).map(|k| base + k as f64));
        let frame = compute(&series_from_closes(&closes));
        assert_eq!(frame.oscillator[43], Some(100.0));

        let mut closes = wave(30);
        let base = closes[29];
        closes.extend((1..=14).map(|k| base - k as f64));
        let frame = compute(&series_from_closes(&closes));
        assert_eq!(frame.oscillator[43], Some(0.0));
    }

    #[test]
    fn compute_is_idempotent() {
        let series = series_from_closes(&wave(120));
        let a = compute(&series);
        let b = compute(&series);
        assert_eq!(a, b);
        for (x, y) in a.upper.iter().zip(&b.upper) {
            assert_eq!(x.map(f64::to_bits), y.map(f64::to_bits));
        }
    }

    #[test]
    fn latest_point_reads_last_index() {
        let frame = compute(&series_from_closes(&wave(25)));
        let p = frame.latest().unwrap();
        assert_eq!(p.oscillator, frame.oscillator[24]);
        assert_eq!(p.upper, frame.upper[24]);
        assert!(frame.at(25).is_none());
    }
}
