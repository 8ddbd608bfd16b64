// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a center band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ), where σ is the *sample* standard deviation
// (n - 1 denominator) of the same trailing closes.

use serde::Serialize;

use super::sma::rolling_mean;

/// Look-back window of the envelope.
pub const BOLLINGER_PERIOD: usize = 20;
/// Band distance in standard deviations.
pub const BOLLINGER_NUM_STD: f64 = 2.0;

/// Aligned band series.  All three are `None` at the same indices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BollingerBands {
    pub center: Vec<Option<f64>>,
    pub upper: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

/// Calculate Bollinger Bands over every trailing `period` window of `closes`.
///
/// Indices `< period - 1` are `None`.  A period below 2 has no sample
/// deviation, so every entry is `None`.
pub fn calculate_bollinger(closes: &[f64], period: usize, num_std: f64) -> BollingerBands {
    let n = closes.len();
    let mut upper = vec![None; n];
    let mut lower = vec![None; n];

    if period < 2 {
        return BollingerBands {
            center: vec![None; n],
            upper,
            lower,
        };
    }

    let center = rolling_mean(closes, period);

    for (i, mid) in center.iter().enumerate() {
        let Some(mid) = *mid else { continue };
        let window = &closes[i + 1 - period..=i];
        let spread = sample_std_dev(window, mid);
        upper[i] = Some(mid + num_std * spread);
        lower[i] = Some(mid - num_std * spread);
    }

    BollingerBands {
        center,
        upper,
        lower,
    }
}

/// Sample standard deviation of `window` around its precomputed `mean`.
pub(crate) fn sample_std_dev(window: &[f64], mean: f64) -> f64 {
    let variance =
        window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (window.len() - 1) as f64;
    variance.sqrt()
}
