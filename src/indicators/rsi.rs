// =============================================================================
// Relative Strength Index (RSI) — simple-mean variant
// =============================================================================
//
// RSI measures the balance of recent gains against recent losses.
//
// Step 1 — Compute close-to-close deltas.  The first bar has no predecessor;
//          its gain and loss are both taken as zero.
// Step 2 — Split into gains (positive deltas) and losses (|negative deltas|).
// Step 3 — Average each with a plain trailing mean over `period` entries.
//          This is NOT Wilder's recursive smoothing; every window is averaged
//          independently.
// Step 4 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// Thresholds:  RSI > 70 => OVERBOUGHT,  RSI < 30 => OVERSOLD.
// =============================================================================

use super::sma::rolling_mean;

/// Look-back window of the oscillator.
pub const RSI_PERIOD: usize = 14;

/// Compute the RSI series for `closes`, aligned index-for-index.
///
/// # Edge cases
/// - Indices `< period - 1` are `None` (insufficient history).
/// - Average loss zero with positive average gain => `Some(100.0)`.
/// - Both averages zero (flat window) => `None`; the ratio is 0/0 and the
///   value is left undefined for that index only.
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut gains = Vec::with_capacity(closes.len());
    let mut losses = Vec::with_capacity(closes.len());

    if !closes.is_empty() {
        gains.push(0.0);
        losses.push(0.0);
    }
    for w in closes.windows(2) {
        let delta = w[1] - w[0];
        gains.push(if delta > 0.0 { delta } else { 0.0 });
        losses.push(if delta < 0.0 { -delta } else { 0.0 });
    }

    let avg_gains = rolling_mean(&gains, period);
    let avg_losses = rolling_mean(&losses, period);

    avg_gains
        .into_iter()
        .zip(avg_losses)
        .map(|(g, l)| rsi_from_averages(g?, l?))
        .collect()
}

/// Convert average gain / average loss into an RSI value in [0, 100].
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 {
        // 0/0 is indeterminate; x/0 with x > 0 is an infinite ratio.
        return (avg_gain > 0.0).then_some(100.0);
    }

    let rs = avg_gain / avg_loss;
    let rsi = 100.0 - 100.0 / (1.0 + rs);
    rsi.is_finite().then_some(rsi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsi_empty_input() {
        assert!(calculate_rsi(&[], RSI_PERIOD).is_empty());
    }

    #[test]
    fn rsi_short_series_all_undefined() {
        let closes: Vec<f64> = (1..=13).map(|x| x as f64).collect();
        let series = calculate_rsi(&closes, RSI_PERIOD);
        assert_eq!(series.len(), 13);
        assert!(series.iter().all(Option::is_none));
    }

    #[test]
    fn rsi_fourteen_rising_closes_is_100() {
        let closes: Vec<f64> = (100..=113).map(|x| x as f64).collect();
        let series = calculate_rsi(&closes, RSI_PERIOD);
        assert_eq!(series.len(), 14);
        assert!(series[..13].iter().all(Option::is_none));
        assert_eq!(series[13], Some(100.0));
    }

    #[test]
    fn rsi_all_losses() {
        let closes: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        let series = calculate_rsi(&closes, RSI_PERIOD);
        for v in &series[13..] {
            assert_eq!(*v, Some(0.0));
        }
    }

    #[test]
    fn rsi_flat_market_is_undefined() {
        let closes = vec![100.0; 30];
        let series = calculate_rsi(&closes, RSI_PERIOD);
        assert!(series.iter().all(Option::is_none));
    }

    #[test]
    fn rsi_flat_window_does_not_contaminate_neighbours() {
        // 20 flat closes followed by one rise: windows ending before the rise
        // are 0/0, the window containing it is defined.
        let mut closes = vec![50.0; 20];
        closes.push(51.0);
        let series = calculate_rsi(&closes, RSI_PERIOD);
        assert!(series[13..20].iter().all(Option::is_none));
        assert_eq!(series[20], Some(100.0));
    }

    #[test]
    fn rsi_uses_simple_mean_not_wilder() {
        // Window ending at index 14 covers the deltas at indices 1..=14.
        // Deltas: +1 x 13 then -13 at the end.
        let mut closes: Vec<f64> = (0..14).map(|x| x as f64).collect();
        closes.push(0.0);
        let series = calculate_rsi(&closes, RSI_PERIOD);
        // avg_gain = 13/14, avg_loss = 13/14 => RS = 1 => RSI = 50.
        let v = series[14].unwrap();
        assert!((v - 50.0).abs() < 1e-9, "expected 50, got {v}");
    }

    #[test]
    fn rsi_range_check() {
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08,
            45.89, 46.03, 44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        for v in calculate_rsi(&closes, RSI_PERIOD).into_iter().flatten() {
            assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
        }
    }
}
