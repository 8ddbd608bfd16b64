// =============================================================================
// Shared types used across the indicator pipeline
// =============================================================================

use anyhow::{ensure, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One OHLC price observation for a fixed time interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Exchange-local wall clock at the start of the bar.
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Bar {
    pub fn new(timestamp: NaiveDateTime, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
        }
    }

    fn prices_valid(&self) -> bool {
        [self.open, self.high, self.low, self.close]
            .iter()
            .all(|p| p.is_finite() && *p >= 0.0)
    }
}

/// Ordered, non-empty sequence of bars (index 0 = oldest).
///
/// Construction is the only place the series invariants are checked, so every
/// `BarSeries` handed to the indicator engine is known to be well-formed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Build a series from bars that are already sorted oldest-first.
    ///
    /// Fails when the input is empty, timestamps are not strictly increasing,
    /// or any price is negative or non-finite.
    pub fn new(bars: Vec<Bar>) -> Result<Self> {
        ensure!(!bars.is_empty(), "bar series must contain at least one bar");

        for (i, bar) in bars.iter().enumerate() {
            ensure!(
                bar.prices_valid(),
                "bar {i} at {} has a negative or non-finite price",
                bar.timestamp
            );
        }

        for (i, pair) in bars.windows(2).enumerate() {
            ensure!(
                pair[0].timestamp < pair[1].timestamp,
                "bar timestamps not strictly increasing at index {}: {} >= {}",
                i + 1,
                pair[0].timestamp,
                pair[1].timestamp
            );
        }

        Ok(Self { bars })
    }

    /// Sort ascending by timestamp, then validate.
    pub fn from_unsorted(mut bars: Vec<Bar>) -> Result<Self> {
        bars.sort_by_key(|b| b.timestamp);
        Self::new(bars)
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Close prices, oldest first.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// The newest bar. Always present because the series is non-empty.
    pub fn last(&self) -> &Bar {
        &self.bars[self.bars.len() - 1]
    }
}

/// Candle width requested from the market-data provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CandleInterval {
    Minute1,
    Minute15,
    Hour1,
    Hour4,
    Day1,
}

impl CandleInterval {
    /// Path segment used by the provider's candle endpoint.
    pub fn api_path(&self) -> &'static str {
        match self {
            Self::Minute1 => "minutes/1",
            Self::Minute15 => "minutes/15",
            Self::Hour1 => "minutes/60",
            Self::Hour4 => "minutes/240",
            Self::Day1 => "days",
        }
    }
}

impl Default for CandleInterval {
    fn default() -> Self {
        Self::Minute15
    }
}

impl std::fmt::Display for CandleInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Minute1 => write!(f, "1m"),
            Self::Minute15 => write!(f, "15m"),
            Self::Hour1 => write!(f, "1h"),
            Self::Hour4 => write!(f, "4h"),
            Self::Day1 => write!(f, "1d"),
        }
    }
}

/// Market code in `QUOTE-BASE` form, e.g. `KRW-BTC`.
///
/// Always trimmed, upper-case and non-empty; deserialisation goes through the
/// same check as [`Market::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Market(String);

impl Market {
    pub fn parse(code: &str) -> Result<Self> {
        let code = code.trim().to_uppercase();
        ensure!(!code.is_empty(), "market code must not be empty");
        ensure!(
            !code.chars().any(char::is_whitespace),
            "market code {code:?} contains whitespace"
        );
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Quote currency, e.g. `KRW-BTC` -> `KRW`.  A code without a dash is
    /// its own quote.
    pub fn quote(&self) -> &str {
        self.0.split_once('-').map_or(&self.0, |(quote, _)| quote)
    }
}

impl Default for Market {
    fn default() -> Self {
        Self("KRW-BTC".to_string())
    }
}

impl std::str::FromStr for Market {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Market {
    type Error = anyhow::Error;

    fn try_from(code: String) -> Result<Self> {
        Self::parse(&code)
    }
}

impl From<Market> for String {
    fn from(market: Market) -> Self {
        market.0
    }
}

impl std::fmt::Display for Market {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::{Duration, NaiveDate};

    /// Build a series of one-minute bars from a close sequence.
    pub fn series_from_closes(closes: &[f64]) -> BarSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                Bar::new(
                    start + Duration::minutes(i as i64),
                    c,
                    c + 1.0,
                    (c - 1.0).max(0.0),
                    c,
                )
            })
            .collect();
        BarSeries::new(bars).unwrap()
    }
}
