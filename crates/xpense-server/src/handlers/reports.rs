//! Dashboard handlers and the shared filter query

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{AppError, AppState, SessionContext};
use xpense_core::models::{
    AvailablePeriods, Category, DashboardSummary, PeriodFilter, TransactionFilter,
    TransactionKind,
};

/// Filter parameters shared by the history list, the dashboard and forecasts
#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    /// income or expense
    pub kind: Option<String>,
    pub category: Option<String>,
    /// all, day, month, year or range
    pub period: Option<String>,
    /// Day for period=day (YYYY-MM-DD)
    pub date: Option<NaiveDate>,
    /// Calendar month for period=month (1-12)
    pub month: Option<u32>,
    /// Year for period=year
    pub year: Option<i32>,
    /// Range start for period=range (YYYY-MM-DD)
    pub from: Option<NaiveDate>,
    /// Range end for period=range (YYYY-MM-DD)
    pub to: Option<NaiveDate>,
}

impl FilterQuery {
    /// Resolve the raw parameters into a validated filter
    pub fn to_filter(&self) -> Result<TransactionFilter, AppError> {
        let kind = match self.kind.as_deref().filter(|s| !s.is_empty()) {
            Some(k) => Some(
                k.parse::<TransactionKind>()
                    .map_err(|e| AppError::bad_request(&e))?,
            ),
            None => None,
        };
        let category = match self.category.as_deref().filter(|s| !s.is_empty()) {
            Some(c) => Some(
                c.parse::<Category>()
                    .map_err(|e| AppError::bad_request(&e))?,
            ),
            None => None,
        };

        Ok(TransactionFilter::new()
            .kind(kind)
            .category(category)
            .period(self.resolve_period()?))
    }

    fn resolve_period(&self) -> Result<PeriodFilter, AppError> {
        let period = self.period.as_deref().unwrap_or("all");
        match period {
            "" | "all" => Ok(PeriodFilter::All),
            "day" => {
                let date = self
                    .date
                    .ok_or_else(|| AppError::bad_request("period=day requires a date"))?;
                Ok(PeriodFilter::Day { date })
            }
            "month" => match self.month {
                Some(month) if (1..=12).contains(&month) => Ok(PeriodFilter::Month { month }),
                Some(_) => Err(AppError::bad_request("Month must be between 1 and 12")),
                None => Err(AppError::bad_request("period=month requires a month")),
            },
            "year" => {
                let year = self
                    .year
                    .ok_or_else(|| AppError::bad_request("period=year requires a year"))?;
                Ok(PeriodFilter::Year { year })
            }
            "range" => match (self.from, self.to) {
                (Some(from), Some(to)) if from <= to => Ok(PeriodFilter::Range { from, to }),
                (Some(_), Some(_)) => Err(AppError::bad_request(
                    "Range start must not be after its end",
                )),
                _ => Err(AppError::bad_request(
                    "period=range requires both from and to",
                )),
            },
            other => Err(AppError::bad_request(&format!(
                "Invalid period: {}. Use all, day, month, year or range",
                other
            ))),
        }
    }
}

/// GET /api/dashboard - Totals, daily series and category breakdown
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Query(params): Query<FilterQuery>,
) -> Result<Json<DashboardSummary>, AppError> {
    let filter = params.to_filter()?;
    let summary = state.db.get_dashboard(&session.username, &filter)?;
    Ok(Json(summary))
}

/// GET /api/dashboard/periods - Months and years that have data, for filter pickers
pub async fn get_periods(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<AvailablePeriods>, AppError> {
    let periods = state.db.get_available_periods(&session.username)?;
    Ok(Json(periods))
}
