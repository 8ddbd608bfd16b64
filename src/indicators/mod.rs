// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free sliding-window indicators.  Every series is aligned
// index-for-index with the input bars; entries without enough history (or
// with an indeterminate value) are `None`, never a sentinel number.

pub mod bollinger;
pub mod frame;
pub mod rsi;
pub mod sma;

pub use frame::compute;
pub use sma::MovingAverages;
