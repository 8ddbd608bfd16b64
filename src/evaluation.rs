// =============================================================================
// Evaluation — one pass of bars -> indicators -> signal
// =============================================================================
//
// Every refresh produces exactly one `Evaluation`.  It carries the bars, the
// overlays the user selected, and the composite signal, so the presentation
// layer can render a complete view from a single record.  Nothing is carried
// over from the previous pass.
// =============================================================================

use serde::Serialize;

use crate::indicators::{self, MovingAverages};
use crate::runtime_config::IndicatorSelection;
use crate::signals::{self, Signal};
use crate::types::{Bar, BarSeries, CandleInterval, Market};

/// Envelope series as published.
#[derive(Debug, Clone, Serialize)]
pub struct EnvelopeOverlay {
    pub center: Vec<Option<f64>>,
    pub upper: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

/// Complete record of one evaluation pass.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    /// Unique identifier for this evaluation (UUID v4).
    pub id: String,

    pub market: Market,

    pub interval: CandleInterval,

    /// Close of the newest bar.
    pub last_price: f64,

    /// Quote currency of `last_price`, e.g. "KRW".
    pub quote_currency: String,

    pub bars: Vec<Bar>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub moving_averages: Option<MovingAverages>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub envelope: Option<EnvelopeOverlay>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub oscillator: Option<Vec<Option<f64>>>,

    pub signal: Signal,

    /// ISO 8601 timestamp of when this evaluation was created.
    pub created_at: String,
}

/// Run the indicator engine and the scorer over `series`.
///
/// The scorer always sees the full frame; `selection` only decides which
/// overlays are attached to the record.
pub fn evaluate(
    market: &Market,
    interval: CandleInterval,
    series: &BarSeries,
    selection: IndicatorSelection,
) -> Evaluation {
    let frame = indicators::compute(series);
    let last_price = series.last().close;

    let signal = match frame.latest() {
        Some(p) => signals::score(p.oscillator, last_price, p.lower, p.upper),
        None => signals::score(None, last_price, None, None),
    };

    let moving_averages = selection
        .moving_averages
        .then(|| MovingAverages::compute(series));

    let envelope = selection.envelope.then(|| EnvelopeOverlay {
        center: frame.center.clone(),
        upper: frame.upper.clone(),
        lower: frame.lower.clone(),
    });

    let oscillator = selection.oscillator.then(|| frame.oscillator.clone());

    Evaluation {
        id: uuid::Uuid::new_v4().to_string(),
        market: market.clone(),
        interval,
        last_price,
        quote_currency: market.quote().to_string(),
        bars: series.bars().to_vec(),
        moving_averages,
        envelope,
        oscillator,
        signal,
        created_at: chrono::Utc::now().to_rfc3339(),
    }
}
