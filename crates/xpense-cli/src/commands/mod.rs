//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Core commands (init, status, register, users) and shared utilities (open_db)
//! - `reports` - Dashboard, forecast and audit log output
//! - `serve` - Web server command
//! - `settings` - Account settings commands
//! - `transactions` - Transaction commands (add, list, delete, receipt)

pub mod core;
pub mod reports;
pub mod serve;
pub mod settings;
pub mod transactions;

// Re-export command functions for main.rs
pub use core::*;
pub use reports::*;
pub use serve::*;
pub use settings::*;
pub use transactions::*;

use anyhow::{bail, Result};
use xpense_core::models::{PeriodFilter, TransactionFilter};

use crate::cli::FilterArgs;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Turn the shared filter flags into a transaction filter
pub fn build_filter(args: &FilterArgs) -> Result<TransactionFilter> {
    let period = match (args.day, args.month, args.year, args.from, args.to) {
        (Some(date), _, _, _, _) => PeriodFilter::Day { date },
        (None, Some(month), _, _, _) => {
            if !(1..=12).contains(&month) {
                bail!("Month must be between 1 and 12, got {}", month);
            }
            PeriodFilter::Month { month }
        }
        (None, None, Some(year), _, _) => PeriodFilter::Year { year },
        (None, None, None, Some(from), Some(to)) => {
            if from > to {
                bail!("--from {} is after --to {}", from, to);
            }
            PeriodFilter::Range { from, to }
        }
        (None, None, None, Some(_), None) | (None, None, None, None, Some(_)) => {
            bail!("A date range needs both --from and --to")
        }
        (None, None, None, None, None) => PeriodFilter::All,
    };

    Ok(TransactionFilter::new()
        .kind(args.kind)
        .category(args.category)
        .period(period))
}
