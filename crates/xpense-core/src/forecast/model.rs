//! Additive time-series forecaster
//!
//! Fits `value ~ intercept + slope * t + seasonal terms` by least squares,
//! where the seasonal terms are Fourier pairs for a weekly cycle (once two
//! weeks of history exist) and a yearly cycle (once two years exist).
//! Uncertainty bands come from the residual standard deviation and widen
//! with the distance past the last observation.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Duration, NaiveDate};
use tracing::debug;

use super::types::{DailyValue, ForecastPoint, ForecastSeries, ForecastTarget};
use crate::error::{Error, Result};
use crate::models::{Transaction, TransactionKind};

/// Largest forecast horizon accepted (days)
pub const MAX_HORIZON: usize = 365;

/// Horizon used when none is requested
pub const DEFAULT_HORIZON: usize = 30;

/// Fewest observed days a model can be fitted on
pub const MIN_OBSERVATIONS: usize = 2;

/// z-score for an 80% interval
const INTERVAL_Z: f64 = 1.2816;

const WEEKLY_PERIOD: f64 = 7.0;
const WEEKLY_ORDER: usize = 3;
const WEEKLY_MIN_SPAN_DAYS: i64 = 14;

const YEARLY_PERIOD: f64 = 365.25;
const YEARLY_ORDER: usize = 10;
const YEARLY_MIN_SPAN_DAYS: i64 = 730;

/// Keeps the normal equations solvable when seasonal columns outnumber observations
const RIDGE: f64 = 1e-6;

/// Something that can turn observed days into a forecast series
pub trait Forecaster {
    /// Fit `history` and return fitted history followed by `horizon` future days
    fn forecast(&self, history: &[DailyValue], horizon: usize) -> Result<ForecastSeries>;
}

/// Trend plus optional weekly/yearly seasonality, fitted by least squares
#[derive(Debug, Clone)]
pub struct AdditiveForecaster {
    interval_z: f64,
}

impl AdditiveForecaster {
    pub fn new() -> Self {
        Self {
            interval_z: INTERVAL_Z,
        }
    }

    /// Override the interval width (z-score of the band half-width)
    pub fn with_interval_z(z: f64) -> Self {
        Self { interval_z: z }
    }
}

impl Default for AdditiveForecaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Which seasonal components a fit includes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Seasonality {
    /// Fourier order of the weekly cycle, 0 when disabled
    weekly_order: usize,
    yearly: bool,
}

impl Seasonality {
    /// Weekly order is capped by weekday coverage: each sin/cos pair needs
    /// two more observed phases.
    fn for_history(span_days: i64, distinct_weekdays: usize) -> Self {
        let weekly_order = if span_days >= WEEKLY_MIN_SPAN_DAYS {
            WEEKLY_ORDER.min(distinct_weekdays.saturating_sub(1) / 2)
        } else {
            0
        };
        Self {
            weekly_order,
            yearly: span_days >= YEARLY_MIN_SPAN_DAYS,
        }
    }

    fn width(&self) -> usize {
        let mut width = 2 + 2 * self.weekly_order;
        if self.yearly {
            width += 2 * YEARLY_ORDER;
        }
        width
    }
}

/// Design row for day offset `t`; the trend column is scaled by `scale`
fn features(t: f64, scale: f64, seasonality: Seasonality) -> Vec<f64> {
    let mut row = Vec::with_capacity(seasonality.width());
    row.push(1.0);
    row.push(t / scale);
    push_fourier(&mut row, t, WEEKLY_PERIOD, seasonality.weekly_order);
    if seasonality.yearly {
        push_fourier(&mut row, t, YEARLY_PERIOD, YEARLY_ORDER);
    }
    row
}

fn push_fourier(row: &mut Vec<f64>, t: f64, period: f64, order: usize) {
    for k in 1..=order {
        let angle = 2.0 * std::f64::consts::PI * k as f64 * t / period;
        row.push(angle.sin());
        row.push(angle.cos());
    }
}

/// Solve `a * x = b` in place by Gaussian elimination with partial pivoting
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        if a[pivot][col].abs() < f64::EPSILON {
            return Err(Error::InvalidData(
                "Forecast model could not be fitted (singular system)".to_string(),
            ));
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        let pivot_row = a[col].clone();
        let pivot_b = b[col];
        for row in (col + 1)..n {
            let factor = a[row][col] / pivot_row[col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * pivot_row[k];
            }
            b[row] -= factor * pivot_b;
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Ok(x)
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

impl Forecaster for AdditiveForecaster {
    fn forecast(&self, history: &[DailyValue], horizon: usize) -> Result<ForecastSeries> {
        validate_horizon(horizon)?;
        if history.len() < MIN_OBSERVATIONS {
            return Err(Error::InsufficientData(format!(
                "At least {} days of data are needed to forecast, found {}",
                MIN_OBSERVATIONS,
                history.len()
            )));
        }

        let mut observed = history.to_vec();
        observed.sort_by_key(|d| d.date);

        let first = observed[0].date;
        let last = observed[observed.len() - 1].date;
        let span = (last - first).num_days();
        let weekdays: BTreeSet<u32> = observed
            .iter()
            .map(|d| d.date.weekday().num_days_from_monday())
            .collect();
        let seasonality = Seasonality::for_history(span, weekdays.len());
        let scale = span.max(1) as f64;
        let width = seasonality.width();

        let rows: Vec<Vec<f64>> = observed
            .iter()
            .map(|d| features((d.date - first).num_days() as f64, scale, seasonality))
            .collect();

        // normal equations: (X'X + ridge) beta = X'y
        let mut xtx = vec![vec![0.0; width]; width];
        let mut xty = vec![0.0; width];
        for (row, obs) in rows.iter().zip(&observed) {
            for i in 0..width {
                xty[i] += row[i] * obs.value;
                for j in 0..width {
                    xtx[i][j] += row[i] * row[j];
                }
            }
        }
        for (i, diag) in xtx.iter_mut().enumerate() {
            diag[i] += RIDGE;
        }
        let beta = solve(xtx, xty)?;

        let n = observed.len();
        let sse: f64 = rows
            .iter()
            .zip(&observed)
            .map(|(row, obs)| (obs.value - dot(row, &beta)).powi(2))
            .sum();
        let dof = n.saturating_sub(width).max(1);
        let sigma = (sse / dof as f64).sqrt();

        debug!(
            observations = n,
            span_days = span,
            weekly_order = seasonality.weekly_order,
            yearly = seasonality.yearly,
            sigma,
            "Fitted additive forecast model"
        );

        let band = |steps_ahead: usize| {
            self.interval_z * sigma * (1.0 + steps_ahead as f64 / n as f64).sqrt()
        };

        let mut points = Vec::with_capacity(n + horizon);
        for (row, obs) in rows.iter().zip(&observed) {
            let estimate = dot(row, &beta);
            let half = band(0);
            points.push(ForecastPoint::new(
                obs.date,
                estimate,
                estimate - half,
                estimate + half,
            ));
        }
        for step in 1..=horizon {
            let date = last + Duration::days(step as i64);
            let row = features((date - first).num_days() as f64, scale, seasonality);
            let estimate = dot(&row, &beta);
            let half = band(step);
            points.push(ForecastPoint::new(
                date,
                estimate,
                estimate - half,
                estimate + half,
            ));
        }

        if points.iter().any(|p| !p.estimate.is_finite() || !p.spread().is_finite()) {
            return Err(Error::InvalidData(
                "Forecast model produced non-finite values".to_string(),
            ));
        }

        Ok(ForecastSeries::new(points))
    }
}

pub fn validate_horizon(horizon: usize) -> Result<()> {
    if !(1..=MAX_HORIZON).contains(&horizon) {
        return Err(Error::InvalidData(format!(
            "Forecast horizon must be between 1 and {} days",
            MAX_HORIZON
        )));
    }
    Ok(())
}

/// Collapse transactions into one value per day for the given target
///
/// Income and expense only include days that have a transaction of that
/// kind. Net profit covers every day with either kind, counting a missing
/// side as zero.
pub fn daily_values(transactions: &[Transaction], target: ForecastTarget) -> Vec<DailyValue> {
    let mut income: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    let mut expense: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for tx in transactions {
        let bucket = match tx.kind {
            TransactionKind::Income => &mut income,
            TransactionKind::Expense => &mut expense,
        };
        *bucket.entry(tx.date).or_insert(0) += tx.amount;
    }

    let to_values = |map: BTreeMap<NaiveDate, i64>| {
        map.into_iter()
            .map(|(date, amount)| DailyValue {
                date,
                value: amount as f64,
            })
            .collect()
    };

    match target {
        ForecastTarget::Income => to_values(income),
        ForecastTarget::Expense => to_values(expense),
        ForecastTarget::NetProfit => {
            let mut net: BTreeMap<NaiveDate, i64> = BTreeMap::new();
            for (date, amount) in income {
                *net.entry(date).or_insert(0) += amount;
            }
            for (date, amount) in expense {
                *net.entry(date).or_insert(0) -= amount;
            }
            to_values(net)
        }
    }
}
