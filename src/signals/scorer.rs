// =============================================================================
// Signal Scorer — oscillator-confirmed envelope breach scoring
// =============================================================================
//
// Decision rule:
//   RSI < 30   => BUY,  magnitude = 50 + (30 - RSI) * 2.5 (+20 below lower band)
//   RSI > 70   => SELL, magnitude = 50 + (RSI - 70) * 2.5 (+20 above upper band)
//   otherwise  => HOLD, magnitude = 0
//
// Magnitude is capped at 100; >= 80 is a Strong signal, below is Moderate.
// A band breach without oscillator confirmation never produces an action.
// =============================================================================

use serde::{Deserialize, Serialize};

pub const OVERSOLD: f64 = 30.0;
pub const OVERBOUGHT: f64 = 70.0;

const BASE_MAGNITUDE: f64 = 50.0;
const OSCILLATOR_WEIGHT: f64 = 2.5;
const BAND_BONUS: f64 = 20.0;
const MAX_MAGNITUDE: f64 = 100.0;
const STRONG_THRESHOLD: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
            Self::Hold => write!(f, "HOLD"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    Strong,
    Moderate,
    Neutral,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strong => write!(f, "Strong"),
            Self::Moderate => write!(f, "Moderate"),
            Self::Neutral => write!(f, "Neutral"),
        }
    }
}

/// Result of one scoring pass.  Recomputed on every evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub action: Action,
    /// Confidence-like score in [0, 100].
    pub magnitude: f64,
    pub tier: Tier,
    pub rationale: String,
}

impl Signal {
    fn hold(rationale: impl Into<String>) -> Self {
        Self {
            action: Action::Hold,
            magnitude: 0.0,
            tier: Tier::Neutral,
            rationale: rationale.into(),
        }
    }

    fn directional(action: Action, oscillator_bonus: f64, band_bonus: f64, rationale: String) -> Self {
        let magnitude = (BASE_MAGNITUDE + oscillator_bonus + band_bonus).min(MAX_MAGNITUDE);
        let tier = if magnitude >= STRONG_THRESHOLD {
            Tier::Strong
        } else {
            Tier::Moderate
        };
        Self {
            action,
            magnitude,
            tier,
            rationale,
        }
    }
}

/// Score the latest oscillator reading against the latest price and bands.
///
/// Any undefined indicator input yields a neutral HOLD with zero magnitude;
/// the function never fails.
pub fn score(oscillator: Option<f64>, price: f64, lower: Option<f64>, upper: Option<f64>) -> Signal {
    let (Some(rsi), Some(lower), Some(upper)) = (
        oscillator.filter(|v| v.is_finite()),
        lower.filter(|v| v.is_finite()),
        upper.filter(|v| v.is_finite()),
    ) else {
        return Signal::hold("insufficient history: indicator values not yet defined");
    };

    if rsi < OVERSOLD {
        let breach = price < lower;
        let band_bonus = if breach { BAND_BONUS } else { 0.0 };
        let rationale = if breach {
            format!("RSI {rsi:.1} oversold and price {price:.2} below lower band {lower:.2}")
        } else {
            format!("RSI {rsi:.1} oversold")
        };
        Signal::directional(Action::Buy, (OVERSOLD - rsi) * OSCILLATOR_WEIGHT, band_bonus, rationale)
    } else if rsi > OVERBOUGHT {
        let breach = price > upper;
        let band_bonus = if breach { BAND_BONUS } else { 0.0 };
        let rationale = if breach {
            format!("RSI {rsi:.1} overbought and price {price:.2} above upper band {upper:.2}")
        } else {
            format!("RSI {rsi:.1} overbought")
        };
        Signal::directional(Action::Sell, (rsi - OVERBOUGHT) * OSCILLATOR_WEIGHT, band_bonus, rationale)
    } else {
        Signal::hold(format!("RSI {rsi:.1} neutral; no momentum confirmation"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deep_oversold_below_band_is_capped_strong_buy() {
        let s = score(Some(10.0), 90.0, Some(95.0), Some(110.0));
        assert_eq!(s.action, Action::Buy);
        assert_eq!(s.magnitude, 100.0);
        assert_eq!(s.tier, Tier::Strong);
    }

    #[test]
    fn mild_oversold_inside_band_is_moderate_buy() {
        let s = score(Some(25.0), 100.0, Some(95.0), Some(110.0));
        assert_eq!(s.action, Action::Buy);
        assert!((s.magnitude - 62.5).abs() < 1e-12);
        assert_eq!(s.tier, Tier::Moderate);
    }

    #[test]
    fn band_breach_without_momentum_is_hold() {
        let s = score(Some(50.0), 120.0, Some(95.0), Some(110.0));
        assert_eq!(s.action, Action::Hold);
        assert_eq!(s.magnitude, 0.0);
        assert_eq!(s.tier, Tier::Neutral);

        let s = score(Some(50.0), 80.0, Some(95.0), Some(110.0));
        assert_eq!(s.action, Action::Hold);
    }

    #[test]
    fn overbought_above_band_sells() {
        let s = score(Some(75.0), 115.0, Some(95.0), Some(110.0));
        assert_eq!(s.action, Action::Sell);
        // 50 + 12.5 + 20
        assert!((s.magnitude - 82.5).abs() < 1e-12);
        assert_eq!(s.tier, Tier::Strong);
        assert!(s.rationale.contains("above upper band"));
    }

    #[test]
    fn overbought_inside_band_is_moderate_sell() {
        let s = score(Some(80.0), 100.0, Some(95.0), Some(110.0));
        assert_eq!(s.action, Action::Sell);
        assert!((s.magnitude - 75.0).abs() < 1e-12);
        assert_eq!(s.tier, Tier::Moderate);
    }

    #[test]
    fn thresholds_are_inclusive_neutral() {
        assert_eq!(score(Some(30.0), 1.0, Some(95.0), Some(110.0)).action, Action::Hold);
        assert_eq!(score(Some(70.0), 500.0, Some(95.0), Some(110.0)).action, Action::Hold);
    }

    #[test]
    fn strong_tier_boundary_is_inclusive() {
        // 50 + (30 - 18) * 2.5 = 80
        let s = score(Some(18.0), 100.0, Some(95.0), Some(110.0));
        assert_eq!(s.magnitude, 80.0);
        assert_eq!(s.tier, Tier::Strong);
    }

    #[test]
    fn undefined_inputs_hold_with_zero() {
        let cases = [
            (None, Some(95.0), Some(110.0)),
            (Some(10.0), None, Some(110.0)),
            (Some(90.0), Some(95.0), None),
            (Some(f64::NAN), Some(95.0), Some(110.0)),
        ];
        for (osc, lo, up) in cases {
            let s = score(osc, 100.0, lo, up);
            assert_eq!(s.action, Action::Hold);
            assert_eq!(s.magnitude, 0.0);
            assert_eq!(s.tier, Tier::Neutral);
            assert!(s.rationale.contains("insufficient history"));
        }
    }

    #[test]
    fn scorer_is_total_over_oscillator_range() {
        for step in 0..=1000 {
            let rsi = step as f64 / 10.0;
            for price in [50.0, 100.0, 150.0] {
                let s = score(Some(rsi), price, Some(95.0), Some(110.0));
                assert!((0.0..=100.0).contains(&s.magnitude));
                let expected = if rsi < 30.0 {
                    Action::Buy
                } else if rsi > 70.0 {
                    Action::Sell
                } else {
                    Action::Hold
                };
                assert_eq!(s.action, expected, "rsi {rsi}");
            }
        }
    }
}
