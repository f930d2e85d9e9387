use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use logtriage_stats::{simple_stats, LogRecord, SimpleStats, Stats};
use serde::{Deserialize, Serialize};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct StatsRequest {
    #[serde(default)]
    pub logs: Vec<LogRecord>,
    /// Bucket width; the configured interval when absent
    #[serde(default, alias = "intervalSecs")]
    pub interval_secs: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub stats: Stats,
    pub simple: SimpleStats,
}

/// `POST /api/stats` - bucketed statistics without any model call
pub async fn compute(
    State(state): State<AppState>,
    payload: Result<Json<StatsRequest>, JsonRejection>,
) -> Result<Json<StatsResponse>, (StatusCode, String)> {
    let Json(request) = payload.map_err(|e| (StatusCode::BAD_REQUEST, e.body_text()))?;

    let interval = request
        .interval_secs
        .map(Duration::from_secs)
        .unwrap_or(state.settings.bucket_interval);
    let stats = Stats::from_logs(&request.logs, interval)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    Ok(Json(StatsResponse {
        stats,
        simple: simple_stats(&request.logs),
    }))
}
