//! Forecast handlers

use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use serde::Deserialize;

use super::reports::FilterQuery;
use crate::{AppError, AppState, SessionContext};
use xpense_core::forecast::{forecast_for_user, ForecastResult, ForecastTarget, DEFAULT_HORIZON};

/// Forecast request body
///
/// Filter fields sit beside `target` and `horizon`; the filter's kind is
/// ignored because the target decides which transactions count.
#[derive(Debug, Deserialize)]
pub struct ForecastRequest {
    pub target: ForecastTarget,
    #[serde(default = "default_horizon")]
    pub horizon: usize,
    #[serde(flatten)]
    pub filter: FilterQuery,
}

fn default_horizon() -> usize {
    DEFAULT_HORIZON
}

/// POST /api/forecast - Forecast income, expense or net profit and explain it
pub async fn create_forecast(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Json(req): Json<ForecastRequest>,
) -> Result<Json<ForecastResult>, AppError> {
    let filter = req.filter.to_filter()?;
    let result = forecast_for_user(
        &state.db,
        &session.username,
        &filter,
        req.target,
        req.horizon,
    )?;

    state.db.log_audit(
        &session.username,
        "forecast",
        Some("forecast"),
        None,
        Some(&format!(
            "target={} horizon={} observed_days={}",
            req.target, req.horizon, result.observed_days
        )),
    )?;

    Ok(Json(result))
}
