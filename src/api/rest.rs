// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`.  This is the presentation boundary:
// charting clients poll the latest evaluation and change the selected market
// or overlays through the config endpoint.
//
// CORS is configured permissively for development; tighten `allowed_origins`
// in production.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::app_state::AppState;
use crate::runtime_config::{IndicatorSelection, RuntimeConfig};
use crate::types::{CandleInterval, Market};

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/evaluation", get(latest_evaluation))
        .route("/api/v1/config", get(get_config).post(set_config))
        .route("/api/v1/refresh", post(refresh))
        .route("/api/v1/errors", get(errors))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    state_version: u64,
    uptime_secs: u64,
    server_time: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        state_version: state.current_state_version(),
        uptime_secs: state.uptime_secs(),
        server_time: chrono::Utc::now().timestamp_millis(),
    })
}

// =============================================================================
// Evaluation
// =============================================================================

async fn latest_evaluation(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let latest = state.latest_evaluation.read().clone();
    match latest {
        Some(eval) => Json(eval).into_response(),
        None => {
            let body = serde_json::json!({
                "evaluation": null,
                "message": "No evaluation available yet"
            });
            Json(body).into_response()
        }
    }
}

// =============================================================================
// Config
// =============================================================================

async fn get_config(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let config = state.runtime_config.read().clone();
    Json(config)
}

#[derive(Deserialize)]
struct ConfigUpdate {
    #[serde(default)]
    market: Option<Market>,
    #[serde(default)]
    interval: Option<CandleInterval>,
    #[serde(default)]
    candle_count: Option<u32>,
    #[serde(default)]
    indicators: Option<IndicatorSelection>,
    #[serde(default)]
    refresh_secs: Option<u64>,
}

impl ConfigUpdate {
    /// Overlay the fields present in the request onto `base`.
    fn apply_to(&self, base: &RuntimeConfig) -> RuntimeConfig {
        let mut next = base.clone();
        if let Some(market) = &self.market {
            next.market = market.clone();
        }
        if let Some(interval) = self.interval {
            next.interval = interval;
        }
        if let Some(count) = self.candle_count {
            next.candle_count = count;
        }
        if let Some(indicators) = self.indicators {
            next.indicators = indicators;
        }
        if let Some(secs) = self.refresh_secs {
            next.refresh_secs = secs;
        }
        next.normalised()
    }
}

/// Apply a partial update.  The effective and the persisted configuration
/// are updated side by side so a startup market override stays in effect
/// without being written to disk.
async fn set_config(
    State(state): State<Arc<AppState>>,
    Json(update): Json<ConfigUpdate>,
) -> impl IntoResponse {
    let (updated, persisted) = {
        let mut config = state.runtime_config.write();
        let mut persisted = state.persisted_config.write();
        *config = update.apply_to(&config);
        *persisted = update.apply_to(&persisted);
        (config.clone(), persisted.clone())
    };

    info!(
        market = %updated.market,
        interval = %updated.interval,
        candle_count = updated.candle_count,
        "Runtime config updated via API"
    );

    if let Err(e) = persisted.save(&state.config_path) {
        warn!(error = %e, "Failed to save runtime config to disk");
    }

    state.increment_version();
    state.request_refresh();

    Json(updated)
}

// =============================================================================
// Refresh / errors
// =============================================================================

#[derive(Serialize)]
struct RefreshResponse {
    message: &'static str,
}

async fn refresh(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.request_refresh();
    (
        StatusCode::ACCEPTED,
        Json(RefreshResponse {
            message: "Refresh requested",
        }),
    )
}

async fn errors(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let errors = state.recent_errors.read().clone();
    Json(errors)
}
