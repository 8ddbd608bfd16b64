// =============================================================================
// Refresh Loop — periodic and on-demand evaluation passes
// =============================================================================
//
// Each pass reads the current configuration, fetches a fresh bar series and
// recomputes everything from scratch.  A failed fetch skips the core for that
// cycle; the previous evaluation stays published and the error is logged.
//
//   tokio::spawn(run_refresh_loop(Arc::clone(&state)));
//
// =============================================================================

use std::sync::Arc;

use anyhow::Result;
use tokio::time::{sleep, Duration};
use tracing::{error, info};

use crate::app_state::AppState;
use crate::evaluation::evaluate;

/// Run one evaluation pass and publish the result.
pub async fn refresh_once(state: &AppState) -> Result<()> {
    let config = state.runtime_config.read().clone();

    let series = state
        .upbit
        .get_candles(&config.market, config.interval, config.candle_count)
        .await?;

    let evaluation = evaluate(&config.market, config.interval, &series, config.indicators);

    info!(
        market = %config.market,
        interval = %config.interval,
        bars = series.len(),
        last_price = evaluation.last_price,
        action = %evaluation.signal.action,
        magnitude = evaluation.signal.magnitude,
        tier = %evaluation.signal.tier,
        "evaluation complete"
    );

    state.set_evaluation(evaluation);
    Ok(())
}

/// Refresh forever: every `refresh_secs`, or sooner when a refresh is
/// requested.  The period is re-read after every pass so config changes take
/// effect without a restart.
pub async fn run_refresh_loop(state: Arc<AppState>) {
    info!("Refresh loop started");

    loop {
        if let Err(e) = refresh_once(&state).await {
            let market = state.runtime_config.read().market.to_string();
            error!(market = %market, error = %e, "refresh failed — skipping this cycle");
            state.push_error(format!("{e:#}"), Some(market));
        }

        let period = Duration::from_secs(state.runtime_config.read().refresh_secs);
        tokio::select! {
            _ = sleep(period) => {}
            _ = state.refresh_requested.notified() => {
                info!("Manual refresh requested");
            }
        }
    }
}
