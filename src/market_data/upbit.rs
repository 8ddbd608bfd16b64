// =============================================================================
// Upbit REST Client — public candle endpoint
// =============================================================================
//
// Fetches recent candles for one market and hands them to the indicator core
// as a validated, oldest-first `BarSeries`.  The provider returns newest-first
// and caps a single request at 200 candles.
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use tracing::{debug, instrument, warn};

use super::candle_cache::{CandleCache, CandleKey};
use crate::runtime_config::MAX_CANDLE_COUNT;
use crate::types::{Bar, BarSeries, CandleInterval, Market};

pub const DEFAULT_BASE_URL: &str = "https://api.upbit.com";

/// How long a fetched series is reused for identical requests.
pub const CACHE_TTL: Duration = Duration::from_secs(15);

const KST_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Upbit REST client with a short-lived response cache.
pub struct UpbitClient {
    base_url: String,
    client: reqwest::Client,
    cache: CandleCache,
}

impl UpbitClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_cache_ttl(base_url, CACHE_TTL)
    }

    /// Like [`UpbitClient::new`] with a custom reuse window.  `Duration::ZERO`
    /// disables the cache.
    pub fn with_cache_ttl(base_url: impl Into<String>, cache_ttl: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("failed to build reqwest client")?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(base_url = %base_url, "UpbitClient initialised");

        Ok(Self {
            base_url,
            client,
            cache: CandleCache::new(cache_ttl),
        })
    }

    /// GET /v1/candles/{interval}?market=..&count=..
    ///
    /// `count` is clamped to the provider maximum.  A cached series is
    /// returned when the same request was answered within [`CACHE_TTL`].
    #[instrument(skip(self), name = "upbit::get_candles")]
    pub async fn get_candles(
        &self,
        market: &Market,
        interval: CandleInterval,
        count: u32,
    ) -> Result<BarSeries> {
        let count = count.clamp(1, MAX_CANDLE_COUNT);
        let key = CandleKey {
            market: market.clone(),
            interval,
            count,
        };
        if let Some(series) = self.cache.get(&key) {
            return Ok(series);
        }

        let url = format!("{}/v1/candles/{}", self.base_url, interval.api_path());
        let count_param = count.to_string();

        let resp = self
            .client
            .get(&url)
            .header("accept", "application/json")
            .query(&[("market", market.as_str()), ("count", count_param.as_str())])
            .send()
            .await
            .with_context(|| format!("GET {url} request failed"))?;

        let status = resp.status();
        if !status.is_success() {
            // Rate-limit and gateway errors are often plain text, not JSON.
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Upbit GET /v1/candles returned {}: {}", status, text);
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse candles response")?;

        let bars = parse_candles(&body)?;
        let series = BarSeries::from_unsorted(bars)
            .with_context(|| format!("invalid candle series for {market}"))?;

        debug!(market = %market, interval = %interval, count = series.len(), "candles fetched");
        self.cache.insert(key, series.clone());
        Ok(series)
    }
}

/// Parse the provider's array-of-objects response into bars (provider order).
///
/// Entries missing a field or carrying an unparseable value are skipped with
/// a warning; a body that is not an array is an error.
pub fn parse_candles(body: &serde_json::Value) -> Result<Vec<Bar>> {
    let raw = body
        .as_array()
        .context("candles response is not an array")?;

    let mut bars = Vec::with_capacity(raw.len());
    for (i, entry) in raw.iter().enumerate() {
        match parse_candle(entry) {
            Ok(bar) => bars.push(bar),
            Err(e) => warn!(index = i, error = %e, "skipping malformed candle entry"),
        }
    }
    Ok(bars)
}

fn parse_candle(entry: &serde_json::Value) -> Result<Bar> {
    let ts = entry["candle_date_time_kst"]
        .as_str()
        .context("missing field candle_date_time_kst")?;
    let timestamp = NaiveDateTime::parse_from_str(ts, KST_FORMAT)
        .with_context(|| format!("failed to parse candle_date_time_kst: {ts}"))?;

    Ok(Bar::new(
        timestamp,
        parse_f64(&entry["opening_price"], "opening_price")?,
        parse_f64(&entry["high_price"], "high_price")?,
        parse_f64(&entry["low_price"], "low_price")?,
        parse_f64(&entry["trade_price"], "trade_price")?,
    ))
}

/// Prices usually arrive as JSON numbers; accept numeric strings as well.
fn parse_f64(val: &serde_json::Value, name: &str) -> Result<f64> {
    match val {
        serde_json::Value::Number(n) => n
            .as_f64()
            .with_context(|| format!("field {name} is not a valid f64")),
        serde_json::Value::String(s) => s
            .parse::<f64>()
            .with_context(|| format!("failed to parse {name} as f64: {s}")),
        _ => anyhow::bail!("field {name} has unexpected JSON type"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
