use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{BarSeries, CandleInterval, Market};

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// Identifies one candle request.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct CandleKey {
    pub market: Market,
    pub interval: CandleInterval,
    pub count: u32,
}

impl std::fmt::Display for CandleKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}x{}", self.market, self.interval, self.count)
    }
}

struct CachedSeries {
    fetched_at: Instant,
    series: BarSeries,
}

// ---------------------------------------------------------------------------
// CandleCache -- thread-safe TTL cache per request key
// ---------------------------------------------------------------------------

/// Short-lived cache of fetched bar series.  Refreshes that arrive inside the
/// TTL reuse the previous response instead of hitting the provider again.
pub struct CandleCache {
    entries: RwLock<HashMap<CandleKey, CachedSeries>>,
    ttl: Duration,
}

impl CandleCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Return a clone of the cached series if it is younger than the TTL.
    pub fn get(&self, key: &CandleKey) -> Option<BarSeries> {
        let map = self.entries.read();
        let entry = map.get(key)?;
        if entry.fetched_at.elapsed() < self.ttl {
            debug!(key = %key, "candle cache hit");
            Some(entry.series.clone())
        } else {
            None
        }
    }

    /// Store a freshly fetched series, evicting anything already expired.
    pub fn insert(&self, key: CandleKey, series: BarSeries) {
        let mut map = self.entries.write();
        let ttl = self.ttl;
        map.retain(|_, e| e.fetched_at.elapsed() < ttl);
        map.insert(
            key,
            CachedSeries {
                fetched_at: Instant::now(),
                series,
            },
        );
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
