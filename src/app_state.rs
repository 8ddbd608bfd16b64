// =============================================================================
// Central Application State
// =============================================================================
//
// Ties the configuration, the market-data client and the latest evaluation
// together for the refresh loop and the HTTP API.
//
// Thread safety:
//   - Atomic counter for lock-free version tracking.
//   - parking_lot::RwLock for all mutable shared values.
//   - tokio::sync::Notify to wake the refresh loop on demand.
// =============================================================================

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::Notify;

use crate::evaluation::Evaluation;
use crate::market_data::UpbitClient;
use crate::runtime_config::RuntimeConfig;
use crate::types::Market;

// =============================================================================
// Error Record
// =============================================================================

/// A recorded error event for the dashboard error log.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    /// Human-readable error message.
    pub message: String,
    /// Market that was being refreshed, if any.
    pub market: Option<String>,
    /// ISO 8601 timestamp.
    pub at: String,
}

// =============================================================================
// AppState
// =============================================================================

/// Maximum number of recent errors to retain.
const MAX_RECENT_ERRORS: usize = 50;

/// Shared state handed to every async task via `Arc<AppState>`.
pub struct AppState {
    /// Incremented on every meaningful state mutation.
    pub state_version: AtomicU64,

    /// Effective configuration the refresh loop reads.
    pub runtime_config: Arc<RwLock<RuntimeConfig>>,

    /// Configuration as written to `config_path`.  Startup overrides change
    /// `runtime_config` only, so they never end up on disk.
    pub persisted_config: RwLock<RuntimeConfig>,

    /// Where config changes made through the API are persisted.
    pub config_path: PathBuf,

    pub upbit: Arc<UpbitClient>,

    /// Result of the most recent successful refresh.
    pub latest_evaluation: RwLock<Option<Evaluation>>,

    pub recent_errors: RwLock<Vec<ErrorRecord>>,

    /// Wakes the refresh loop ahead of its next tick.
    pub refresh_requested: Notify,

    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(config: RuntimeConfig, upbit: UpbitClient, config_path: impl Into<PathBuf>) -> Self {
        Self {
            state_version: AtomicU64::new(1),
            persisted_config: RwLock::new(config.clone()),
            runtime_config: Arc::new(RwLock::new(config)),
            config_path: config_path.into(),
            upbit: Arc::new(upbit),
            latest_evaluation: RwLock::new(None),
            recent_errors: RwLock::new(Vec::new()),
            refresh_requested: Notify::new(),
            start_time: std::time::Instant::now(),
        }
    }

    /// Select `market` for this process without touching the persisted
    /// configuration.
    pub fn apply_market_override(&self, market: Market) {
        self.runtime_config.write().market = market;
        self.increment_version();
    }

    // ── Version Management ──────────────────────────────────────────────

    pub fn increment_version(&self) -> u64 {
        self.state_version.fetch_add(1, Ordering::SeqCst)
    }

    pub fn current_state_version(&self) -> u64 {
        self.state_version.load(Ordering::SeqCst)
    }

    // ── Error Logging ───────────────────────────────────────────────────

    /// Record an error message. The ring buffer is capped at
    /// [`MAX_RECENT_ERRORS`]; oldest entries are evicted first.
    pub fn push_error(&self, msg: String, market: Option<String>) {
        let record = ErrorRecord {
            message: msg,
            market,
            at: Utc::now().to_rfc3339(),
        };

        let mut errors = self.recent_errors.write();
        errors.push(record);
        while errors.len() > MAX_RECENT_ERRORS {
            errors.remove(0);
        }
        drop(errors);

        self.increment_version();
    }

    // ── Evaluation ──────────────────────────────────────────────────────

    /// Replace the published evaluation.
    pub fn set_evaluation(&self, evaluation: Evaluation) {
        *self.latest_evaluation.write() = Some(evaluation);
        self.increment_version();
    }

    pub fn request_refresh(&self) {
        self.refresh_requested.notify_one();
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::evaluate;
    use crate::runtime_config::IndicatorSelection;
    use crate::types::test_support::series_from_closes;
    use crate::types::{CandleInterval, Market};

    fn test_state() -> AppState {
        let client = UpbitClient::new("http://127.0.0.1:9").unwrap();
        AppState::new(RuntimeConfig::default(), client, "unused.json")
    }

    #[test]
    fn error_log_is_capped() {
        let state = test_state();
        for i in 0..(MAX_RECENT_ERRORS + 5) {
            state.push_error(format!("err {i}"), None);
        }
        let errors = state.recent_errors.read();
        assert_eq!(errors.len(), MAX_RECENT_ERRORS);
        assert_eq!(errors[0].message, "err 5");
    }

    #[test]
    fn set_evaluation_bumps_version() {
        let state = test_state();
        let before = state.current_state_version();
        let series = series_from_closes(&[1.0, 2.0]);
        state.set_evaluation(evaluate(
            &Market::default(),
            CandleInterval::Minute15,
            &series,
            IndicatorSelection::default(),
        ));
        assert!(state.current_state_version() > before);
        assert!(state.latest_evaluation.read().is_some());
    }

    #[test]
    fn market_override_leaves_persisted_config_alone() {
        let state = test_state();
        state.apply_market_override(Market::parse("KRW-XRP").unwrap());
        assert_eq!(state.runtime_config.read().market.as_str(), "KRW-XRP");
        assert_eq!(state.persisted_config.read().market, Market::default());
    }
}
