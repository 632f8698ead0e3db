// Stats control handlers

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use std::time::Instant;

use super::response::{error_response, json_response, ok_response};
use super::types::{StatsConfigRequest, StatsInfoResponse};
use crate::config::{is_valid_interval, AppState};
use crate::error::ControlError;
use crate::logger;
use crate::stats::TimeUnit;

/// GET /control/stats - aggregated data at the granularity of the current interval
pub async fn handle_stats(state: &AppState) -> Response<Full<Bytes>> {
    let unit = TimeUnit::for_interval(*state.stats_interval.read().await);

    let started = Instant::now();
    let data = state.stats.get_data(unit);
    logger::log_elapsed(&format!("Stats: prepared data ({unit})"), started.elapsed());

    json_response(StatusCode::OK, &data)
}

/// POST /control/stats_reset - drop every counter
pub fn handle_stats_reset(state: &AppState) -> Response<Full<Bytes>> {
    state.stats.clear();
    ok_response()
}

/// POST /control/stats_config - change the interval
pub async fn handle_stats_config(state: &AppState, body: &[u8]) -> Response<Full<Bytes>> {
    match apply_stats_config(state, body).await {
        Ok(()) => ok_response(),
        Err(e) => error_response(&e),
    }
}

async fn apply_stats_config(state: &AppState, body: &[u8]) -> Result<(), ControlError> {
    // A `null` body decodes like `{}`, both leave the interval at 0
    let req: StatsConfigRequest = serde_json::from_slice::<Option<StatsConfigRequest>>(body)
        .map_err(ControlError::Decode)?
        .unwrap_or_default();
    let requested = req.interval.unwrap_or(0);

    let days = u32::try_from(requested)
        .ok()
        .filter(|days| is_valid_interval(*days))
        .ok_or(ControlError::UnsupportedInterval(requested))?;

    // Held across store, engine and persistence so concurrent updates apply in one order
    let mut interval = state.stats_interval.write().await;
    *interval = days;
    state.stats.configure(days);

    if let Err(e) = state.state_manager.update_stats_interval(days).await {
        logger::log_error(&format!("Failed to persist stats interval: {e}"));
    }
    Ok(())
}

/// GET /control/stats_info - current interval
pub async fn handle_stats_info(state: &AppState) -> Response<Full<Bytes>> {
    let resp = StatsInfoResponse {
        interval: *state.stats_interval.read().await,
    };
    json_response(StatusCode::OK, &resp)
}
