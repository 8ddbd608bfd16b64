pub mod candle_cache;
pub mod upbit;

pub use upbit::UpbitClient;
