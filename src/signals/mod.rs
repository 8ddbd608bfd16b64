// =============================================================================
// Signals Module
// =============================================================================
//
// Composite trading-signal scoring from the latest oscillator and envelope
// values.

pub mod scorer;

pub use scorer::{score, Signal};
