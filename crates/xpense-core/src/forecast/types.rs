//! Forecast data types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of a forecast with its uncertainty band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub estimate: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl ForecastPoint {
    pub fn new(date: NaiveDate, estimate: f64, lower_bound: f64, upper_bound: f64) -> Self {
        Self {
            date,
            estimate,
            lower_bound,
            upper_bound,
        }
    }

    /// Width of the uncertainty band
    pub fn spread(&self) -> f64 {
        self.upper_bound - self.lower_bound
    }
}

/// Fitted history followed by the future points, ascending by date
///
/// The last `horizon` points are the future; everything before them is the
/// model's fit of observed days.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForecastSeries {
    points: Vec<ForecastPoint>,
}

impl ForecastSeries {
    pub fn new(points: Vec<ForecastPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The trailing `horizon` points (the whole series when it is shorter)
    pub fn future(&self, horizon: usize) -> &[ForecastPoint] {
        let start = self.points.len().saturating_sub(horizon);
        &self.points[start..]
    }
}

impl From<Vec<ForecastPoint>> for ForecastSeries {
    fn from(points: Vec<ForecastPoint>) -> Self {
        Self::new(points)
    }
}

/// Ordered natural-language findings about a forecast
pub type InsightReport = Vec<String>;

/// One observed day fed to a forecaster
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyValue {
    pub date: NaiveDate,
    pub value: f64,
}

/// Which daily quantity to forecast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastTarget {
    Income,
    Expense,
    /// Income minus expense per day
    NetProfit,
}

impl ForecastTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::NetProfit => "net_profit",
        }
    }

    /// Human-readable name embedded in insight text
    pub fn label(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::NetProfit => "net profit",
        }
    }
}

impl std::str::FromStr for ForecastTarget {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "net_profit" => Ok(Self::NetProfit),
            _ => Err(format!("Unknown forecast target: {}", s)),
        }
    }
}

impl std::fmt::Display for ForecastTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Output of a full forecasting request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResult {
    pub target: ForecastTarget,
    pub horizon: usize,
    /// Number of observed days the model was fitted on
    pub observed_days: usize,
    pub series: ForecastSeries,
    pub insights: InsightReport,
}
