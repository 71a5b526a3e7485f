//! Forecasting and forecast insights
//!
//! A request runs in four steps: collect the user's transactions, collapse
//! them into one value per day for the chosen target, fit a [`Forecaster`],
//! then describe the result with [`generate_insights`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use xpense_core::forecast::{forecast_for_user, ForecastTarget};
//!
//! let result = forecast_for_user(&db, "alice", &filter, ForecastTarget::NetProfit, 30)?;
//! for line in &result.insights {
//!     println!("- {}", line);
//! }
//! ```

pub mod insights;
pub mod model;
pub mod types;

pub use insights::{generate_insights, ConfidenceTier};
pub use model::{
    daily_values, validate_horizon, AdditiveForecaster, Forecaster, DEFAULT_HORIZON, MAX_HORIZON,
    MIN_OBSERVATIONS,
};
pub use types::{
    DailyValue, ForecastPoint, ForecastResult, ForecastSeries, ForecastTarget, InsightReport,
};

use tracing::info;

use crate::error::Result;
use crate::models::{Transaction, TransactionFilter};
use crate::repository::TransactionRepository;

/// Forecast `target` for a user's transactions with the default model
///
/// The filter's period and category narrow the history; its kind is ignored
/// because the target already decides which kinds count.
pub fn forecast_for_user<R: TransactionRepository + ?Sized>(
    repo: &R,
    username: &str,
    filter: &TransactionFilter,
    target: ForecastTarget,
    horizon: usize,
) -> Result<ForecastResult> {
    validate_horizon(horizon)?;
    let filter = filter.clone().kind(None);
    let transactions = repo.list_transactions(username, &filter)?;
    let result = forecast_transactions(
        &AdditiveForecaster::new(),
        &transactions,
        target,
        horizon,
    )?;

    info!(
        username,
        target = target.as_str(),
        horizon,
        observed_days = result.observed_days,
        "Generated forecast"
    );
    Ok(result)
}

/// Run any forecaster over an in-memory set of transactions
pub fn forecast_transactions<F: Forecaster + ?Sized>(
    forecaster: &F,
    transactions: &[Transaction],
    target: ForecastTarget,
    horizon: usize,
) -> Result<ForecastResult> {
    let history = daily_values(transactions, target);
    let series = forecaster.forecast(&history, horizon)?;
    let insights = generate_insights(&series, horizon, target.label());

    Ok(ForecastResult {
        target,
        horizon,
        observed_days: history.len(),
        series,
        insights,
    })
}
