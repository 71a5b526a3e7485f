//! Insight Generator
//!
//! Turns a forecast series into ordered plain-language findings:
//! 1. trend over the horizon
//! 2. confidence in the forecast (width of the uncertainty band)
//! 3. seasonal variation within the future window
//!
//! When the future window is empty a single "no data" finding is returned
//! instead. Nothing here fails; degenerate inputs fall back to fixed
//! wording.

use super::types::{ForecastSeries, InsightReport};
use crate::ledger::format_rupiah;

/// Band width below this share of the mean estimate reads as high confidence
const HIGH_CONFIDENCE_RATIO: f64 = 0.1;

/// Band width below this share reads as moderate confidence
const MODERATE_CONFIDENCE_RATIO: f64 = 0.3;

/// Estimate range above this share of the mean suggests a seasonal pattern
const SEASONAL_SPREAD_RATIO: f64 = 0.2;

/// How confident the model is, judged from the average band width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceTier {
    High,
    Moderate,
    Uncertain,
    /// Average estimate is zero so no ratio exists
    Unassessable,
}

impl ConfidenceTier {
    pub fn classify(avg_uncertainty: f64, avg_estimate: f64) -> Self {
        if avg_estimate == 0.0 {
            return Self::Unassessable;
        }
        let scale = avg_estimate.abs();
        if avg_uncertainty < scale * HIGH_CONFIDENCE_RATIO {
            Self::High
        } else if avg_uncertainty < scale * MODERATE_CONFIDENCE_RATIO {
            Self::Moderate
        } else {
            Self::Uncertain
        }
    }
}

/// Generate the findings for the last `horizon` points of `series`
///
/// `label` names the forecast quantity ("income", "net profit", ...) and is
/// embedded in every finding.
pub fn generate_insights(series: &ForecastSeries, horizon: usize, label: &str) -> InsightReport {
    let future = series.future(horizon);
    let Some(last) = future.last() else {
        return vec![format!(
            "No future {} forecast data is available to analyze.",
            label
        )];
    };

    let points = series.points();
    let baseline = if points.len() > horizon {
        points[points.len() - horizon - 1].estimate
    } else {
        points.first().map(|p| p.estimate).unwrap_or(0.0)
    };

    let count = future.len() as f64;
    let avg_future = future.iter().map(|p| p.estimate).sum::<f64>() / count;
    let avg_uncertainty = future.iter().map(|p| p.spread()).sum::<f64>() / count;
    let min_future = future
        .iter()
        .map(|p| p.estimate)
        .fold(f64::INFINITY, f64::min);
    let max_future = future
        .iter()
        .map(|p| p.estimate)
        .fold(f64::NEG_INFINITY, f64::max);

    let mut insights = Vec::with_capacity(3);
    insights.push(trend_statement(last.estimate - baseline, horizon, label));
    insights.push(confidence_statement(avg_uncertainty, avg_future, label));
    insights.push(seasonality_statement(
        min_future, max_future, avg_future, horizon, label,
    ));
    insights
}

fn trend_statement(change: f64, horizon: usize, label: &str) -> String {
    let subject = capitalize(label);
    if change > 0.0 {
        format!(
            "{} is expected to show an increasing trend over the next {} days, \
             rising by about {} from the last recorded period.",
            subject,
            horizon,
            format_rupiah(change)
        )
    } else if change < 0.0 {
        format!(
            "{} is expected to show a decreasing trend over the next {} days, \
             falling by about {} from the last recorded period.",
            subject,
            horizon,
            format_rupiah(change.abs())
        )
    } else {
        format!(
            "{} is expected to remain stable over the next {} days.",
            subject, horizon
        )
    }
}

fn confidence_statement(avg_uncertainty: f64, avg_future: f64, label: &str) -> String {
    let band = format_rupiah(avg_uncertainty);
    match ConfidenceTier::classify(avg_uncertainty, avg_future) {
        ConfidenceTier::High => format!(
            "The model shows high confidence in this {} forecast, with an average \
             uncertainty range of about {} per day.",
            label, band
        ),
        ConfidenceTier::Moderate => format!(
            "The {} forecast has moderate confidence, with an average uncertainty \
             range of about {} per day. Small fluctuations may occur.",
            label, band
        ),
        ConfidenceTier::Uncertain => format!(
            "There is considerable uncertainty in this {} forecast, with an average \
             uncertainty range of about {} per day. This can come from highly varied \
             history; consider adding more data or checking for anomalies.",
            label, band
        ),
        ConfidenceTier::Unassessable => format!(
            "Volatility cannot be assessed because the average forecast {} is zero.",
            label
        ),
    }
}

fn seasonality_statement(
    min_future: f64,
    max_future: f64,
    avg_future: f64,
    horizon: usize,
    label: &str,
) -> String {
    let spread = max_future - min_future;
    if avg_future != 0.0 && spread > avg_future.abs() * SEASONAL_SPREAD_RATIO {
        format!(
            "There are signs of a seasonal pattern in {}, fluctuating between {} and {} \
             over the next {} days. Watch for days or periods when {} may run higher or lower.",
            label,
            format_rupiah(min_future),
            format_rupiah(max_future),
            horizon,
            label
        )
    } else {
        format!(
            "No significant seasonal pattern is visible in this forecast period; \
             {} looks fairly consistent from day to day.",
            label
        )
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::types::ForecastPoint;
    use chrono::{Duration, NaiveDate};

    fn series(points: &[(f64, f64, f64)]) -> ForecastSeries {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        points
            .iter()
            .enumerate()
            .map(|(i, (est, lo, hi))| {
                ForecastPoint::new(start + Duration::days(i as i64), *est, *lo, *hi)
            })
            .collect::<Vec<_>>()
            .into()
    }

    fn flat(estimates: &[f64]) -> ForecastSeries {
        series(
            &estimates
                .iter()
                .map(|e| (*e, *e, *e))
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn test_worked_example() {
        let s = series(&[
            (100.0, 100.0, 100.0),
            (150.0, 140.0, 160.0),
            (200.0, 180.0, 220.0),
        ]);
        let report = generate_insights(&s, 2, "income");
        assert_eq!(report.len(), 3);

        assert!(report[0].starts_with("Income is expected to show an increasing trend"));
        assert!(report[0].contains("next 2 days"));
        assert!(report[0].contains("Rp 100 "));

        // avg uncertainty 30 against avg 175 -> ratio ~0.171
        assert!(report[1].contains("moderate confidence"));
        assert!(report[1].contains("Rp 30 per day"));

        assert!(report[2].contains("seasonal pattern in income"));
        assert!(report[2].contains("between Rp 150 and Rp 200"));
    }

    #[test]
    fn test_empty_series_reports_no_data() {
        let report = generate_insights(&ForecastSeries::default(), 5, "net profit");
        assert_eq!(
            report,
            vec!["No future net profit forecast data is available to analyze.".to_string()]
        );
    }

    #[test]
    fn test_zero_horizon_reports_no_data() {
        let report = generate_insights(&flat(&[1.0, 2.0]), 0, "expense");
        assert_eq!(report.len(), 1);
        assert!(report[0].contains("expense"));
    }

    #[test]
    fn test_decreasing_trend_reports_magnitude() {
        let s = flat(&[5_000_000.0, 4_000_000.0, 3_500_000.0]);
        let report = generate_insights(&s, 2, "expense");
        assert!(report[0].contains("decreasing trend"));
        assert!(report[0].contains("Rp 1,500,000"));
        assert!(!report[0].contains('-'));
    }

    #[test]
    fn test_stable_trend() {
        let s = flat(&[200.0, 180.0, 200.0]);
        let report = generate_insights(&s, 2, "income");
        assert_eq!(
            report[0],
            "Income is expected to remain stable over the next 2 days."
        );
    }

    #[test]
    fn test_baseline_falls_back_to_first_point() {
        // all points are future: baseline is the first estimate
        let s = flat(&[100.0, 50.0]);
        let report = generate_insights(&s, 5, "income");
        assert!(report[0].contains("decreasing trend"));
        assert!(report[0].contains("Rp 50 "));

        // single point against itself
        let report = generate_insights(&flat(&[70.0]), 1, "income");
        assert!(report[0].contains("remain stable"));
    }

    #[test]
    fn test_confidence_tiers() {
        assert_eq!(ConfidenceTier::classify(9.9, 100.0), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::classify(10.0, 100.0), ConfidenceTier::Moderate);
        assert_eq!(ConfidenceTier::classify(29.9, -100.0), ConfidenceTier::Moderate);
        assert_eq!(ConfidenceTier::classify(30.0, 100.0), ConfidenceTier::Uncertain);
        assert_eq!(ConfidenceTier::classify(0.0, 0.0), ConfidenceTier::Unassessable);
        assert_eq!(ConfidenceTier::classify(500.0, 0.0), ConfidenceTier::Unassessable);
    }

    #[test]
    fn test_high_uncertainty_wording() {
        let s = series(&[(100.0, 100.0, 100.0), (100.0, 0.0, 200.0)]);
        let report = generate_insights(&s, 1, "income");
        assert!(report[1].contains("considerable uncertainty"));
        assert!(report[1].contains("adding more data"));
    }

    #[test]
    fn test_zero_average_cannot_assess() {
        let s = series(&[(0.0, 0.0, 0.0), (-50.0, -60.0, -40.0), (50.0, 40.0, 60.0)]);
        let report = generate_insights(&s, 2, "net profit");
        assert_eq!(
            report[1],
            "Volatility cannot be assessed because the average forecast net profit is zero."
        );
        // zero average never reports a pattern even with a wide range
        assert!(report[2].contains("fairly consistent"));
        assert!(report[0].starts_with("Net profit"));
    }

    #[test]
    fn test_consistent_when_spread_small() {
        let s = flat(&[1000.0, 1000.0, 1100.0]);
        let report = generate_insights(&s, 2, "income");
        // spread 100 is not above 0.2 * 1050
        assert!(report[2].contains("fairly consistent"));
        assert!(report[1].contains("high confidence"));
    }

    #[test]
    fn test_negative_values_cite_signed_extremes() {
        let s = flat(&[0.0, -100_000.0, -20_000.0]);
        let report = generate_insights(&s, 2, "net profit");
        assert!(report[2].contains("between Rp -100,000 and Rp -20,000"));
    }

    #[test]
    fn test_idempotent() {
        let s = series(&[(10.0, 9.0, 11.0), (12.0, 10.0, 14.0), (8.0, 5.0, 11.0)]);
        assert_eq!(
            generate_insights(&s, 2, "income"),
            generate_insights(&s, 2, "income")
        );
    }

    #[test]
    fn test_every_finding_names_label() {
        let s = series(&[(10.0, 9.0, 11.0), (12.0, 10.0, 14.0), (8.0, 5.0, 11.0)]);
        for finding in generate_insights(&s, 2, "expense") {
            assert!(finding.to_lowercase().contains("expense"), "{}", finding);
        }
    }
}
