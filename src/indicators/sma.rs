// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
// Plain arithmetic mean over a trailing window.  Used directly for the price
// overlays and as the building block of the oscillator and envelope.

use serde::Serialize;

use crate::types::BarSeries;

/// Trailing-window arithmetic mean, aligned with `values`.
///
/// Entry `i` is `Some(mean(values[i + 1 - window ..= i]))` for
/// `i >= window - 1`, otherwise `None`.  `window == 0` yields all `None`.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }

    for (i, slot) in out.iter_mut().enumerate().skip(window - 1) {
        let slice = &values[i + 1 - window..=i];
        *slot = Some(slice.iter().sum::<f64>() / window as f64);
    }
    out
}

/// Short / medium / long moving-average overlays on the close.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovingAverages {
    pub ma5: Vec<Option<f64>>,
    pub ma20: Vec<Option<f64>>,
    pub ma60: Vec<Option<f64>>,
}

impl MovingAverages {
    pub fn compute(series: &BarSeries) -> Self {
        let closes = series.closes();
        Self {
            ma5: rolling_mean(&closes, 5),
            ma20: rolling_mean(&closes, 20),
            ma60: rolling_mean(&closes, 60),
        }
    }
}
