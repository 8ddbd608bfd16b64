// =============================================================================
// Runtime Configuration — Hot-reloadable chart settings with atomic save
// =============================================================================
//
// Everything the refresh loop needs to know about *what* to fetch and *what*
// to publish lives here, so the selected market survives across refreshes
// without any hidden global state.  The indicator core never reads it.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash.  All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
//
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::{CandleInterval, Market};

/// File the configuration is loaded from and saved to.
pub const CONFIG_PATH: &str = "runtime_config.json";

/// Provider maximum for a single candle request.
pub const MAX_CANDLE_COUNT: u32 = 200;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_true() -> bool {
    true
}

fn default_candle_count() -> u32 {
    MAX_CANDLE_COUNT
}

fn default_refresh_secs() -> u64 {
    15
}

// =============================================================================
// IndicatorSelection
// =============================================================================

/// Which overlays are published alongside the price bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorSelection {
    /// MA5 / MA20 / MA60 price overlays.
    #[serde(default)]
    pub moving_averages: bool,

    /// Bollinger envelope (center / upper / lower).
    #[serde(default = "default_true")]
    pub envelope: bool,

    /// RSI sub-chart.
    #[serde(default = "default_true")]
    pub oscillator: bool,
}

impl Default for IndicatorSelection {
    fn default() -> Self {
        Self {
            moving_averages: false,
            envelope: true,
            oscillator: true,
        }
    }
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level runtime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Market code in `QUOTE-BASE` form, e.g. `KRW-BTC`.
    #[serde(default)]
    pub market: Market,

    #[serde(default)]
    pub interval: CandleInterval,

    /// Bars requested per refresh.  Clamped to [`MAX_CANDLE_COUNT`].
    #[serde(default = "default_candle_count")]
    pub candle_count: u32,

    #[serde(default)]
    pub indicators: IndicatorSelection,

    /// Seconds between automatic refreshes.
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            market: Market::default(),
            interval: CandleInterval::default(),
            candle_count: default_candle_count(),
            indicators: IndicatorSelection::default(),
            refresh_secs: default_refresh_secs(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        info!(
            path = %path.display(),
            market = %config.market,
            interval = %config.interval,
            "runtime config loaded"
        );

        Ok(config.normalised())
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise runtime config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "runtime config saved (atomic)");
        Ok(())
    }

    /// Clamp out-of-range values.  The market code is already canonical.
    pub fn normalised(mut self) -> Self {
        self.candle_count = self.candle_count.clamp(1, MAX_CANDLE_COUNT);
        self.refresh_secs = self.refresh_secs.max(1);
        self
    }
}
