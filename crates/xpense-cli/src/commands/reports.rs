//! Report command implementations (dashboard, forecast, audit)

use anyhow::Result;
use xpense_core::db::Database;
use xpense_core::forecast::{forecast_for_user, ForecastResult, ForecastTarget};
use xpense_core::ledger::format_rupiah;

use super::build_filter;
use crate::cli::FilterArgs;

fn rp(value: i64) -> String {
    format_rupiah(value as f64)
}

pub fn cmd_dashboard(db: &Database, username: &str, filter: &FilterArgs) -> Result<()> {
    let filter = build_filter(filter)?;
    let summary = db.get_dashboard(username, &filter)?;

    println!();
    println!("╭─────────────────────────────────────────╮");
    println!("│           💰 Xpense Dashboard           │");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Income:          {}", rp(summary.total_income));
    println!("  Expense:         {}", rp(summary.total_expense));
    println!("  Net profit:      {}", rp(summary.net_profit));
    println!("  Emergency fund:  {}", rp(summary.total_emergency_fund));

    if let (Some(first), Some(last)) = (summary.first_date, summary.last_date) {
        println!("  Period:          {} → {} ({} days with data)", first, last, summary.daily.len());
    } else {
        println!();
        println!("  No transactions match this filter.");
        return Ok(());
    }

    if !summary.categories.is_empty() {
        println!();
        println!("  By category:");
        for cat in &summary.categories {
            println!(
                "    {:<14} {:>18}  ({} transactions)",
                cat.category,
                rp(cat.amount),
                cat.transaction_count
            );
        }
    }

    println!();
    Ok(())
}

pub fn cmd_forecast(
    db: &Database,
    username: &str,
    filter: &FilterArgs,
    target: ForecastTarget,
    horizon: usize,
    json: bool,
) -> Result<ForecastResult> {
    let filter = build_filter(filter)?;
    let result = forecast_for_user(db, username, &filter, target, horizon)?;

    db.log_audit(
        username,
        "forecast",
        Some("forecast"),
        None,
        Some(&format!("target={} horizon={} (cli)", target, horizon)),
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(result);
    }

    println!();
    println!(
        "🔮 {} forecast for the next {} days ({} days of history)",
        target.label(),
        horizon,
        result.observed_days
    );
    println!("   ─────────────────────────────────────────────────────────────");
    for point in result.series.future(horizon) {
        println!(
            "   {} │ {:>18} │ {} … {}",
            point.date,
            format_rupiah(point.estimate),
            format_rupiah(point.lower_bound),
            format_rupiah(point.upper_bound)
        );
    }

    println!();
    println!("💡 Insights");
    for line in &result.insights {
        println!("   • {}", line);
    }
    println!();

    Ok(result)
}

pub fn cmd_audit(db: &Database, username: Option<&str>, limit: i64) -> Result<()> {
    let entries = db.list_audit_log(username, limit.max(1))?;

    if entries.is_empty() {
        println!("No audit entries.");
        return Ok(());
    }

    println!();
    println!("📜 Audit Log");
    println!("   ─────────────────────────────────────────────────────────────");
    for entry in entries {
        let target = match (&entry.entity_type, entry.entity_id) {
            (Some(t), Some(id)) => format!("{} #{}", t, id),
            (Some(t), None) => t.clone(),
            _ => String::new(),
        };
        println!(
            "   {} │ {:<16} │ {:<22} │ {:<18} │ {}",
            entry.timestamp,
            entry.username,
            entry.action,
            target,
            entry.details.as_deref().unwrap_or("")
        );
    }

    Ok(())
}
