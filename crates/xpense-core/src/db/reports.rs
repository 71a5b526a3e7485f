//! Dashboard aggregates

use rusqlite::params;

use super::transaction_filter::SqlFilter;
use super::{parse_date, parse_enum, Database};
use crate::error::Result;
use crate::models::*;

impl Database {
    /// Totals, per-day series and per-category breakdown for a user's filtered transactions
    pub fn get_dashboard(&self, username: &str, filter: &TransactionFilter) -> Result<DashboardSummary> {
        let conn = self.conn()?;
        let built = SqlFilter::for_user(username).apply(filter).build();

        let totals_sql = format!(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN t.kind = 'income' THEN t.amount END), 0),
                COALESCE(SUM(CASE WHEN t.kind = 'expense' THEN t.amount END), 0),
                COALESCE(SUM(t.emergency_fund), 0),
                MIN(t.date),
                MAX(t.date)
            FROM transactions t
            {}
            "#,
            built.where_clause
        );
        let (total_income, total_expense, total_emergency_fund, first, last): (
            i64,
            i64,
            i64,
            Option<String>,
            Option<String>,
        ) = conn.query_row(&totals_sql, built.params_refs().as_slice(), |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
        })?;

        let first_date = first.as_deref().map(|d| parse_date(3, d)).transpose()?;
        let last_date = last.as_deref().map(|d| parse_date(4, d)).transpose()?;

        // Both sides present on every day that has any transaction
        let daily_sql = format!(
            r#"
            SELECT
                t.date,
                COALESCE(SUM(CASE WHEN t.kind = 'income' THEN t.amount END), 0),
                COALESCE(SUM(CASE WHEN t.kind = 'expense' THEN t.amount END), 0)
            FROM transactions t
            {}
            GROUP BY t.date
            ORDER BY t.date
            "#,
            built.where_clause
        );
        let mut stmt = conn.prepare(&daily_sql)?;
        let daily = stmt
            .query_map(built.params_refs().as_slice(), |row| {
                let date: String = row.get(0)?;
                Ok(DailyTotals {
                    date: parse_date(0, &date)?,
                    income: row.get(1)?,
                    expense: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let category_sql = format!(
            r#"
            SELECT t.category, SUM(t.amount), COUNT(*)
            FROM transactions t
            {}
            GROUP BY t.category
            ORDER BY SUM(t.amount) DESC, t.category
            "#,
            built.where_clause
        );
        let mut stmt = conn.prepare(&category_sql)?;
        let categories = stmt
            .query_map(built.params_refs().as_slice(), |row| {
                let category: String = row.get(0)?;
                Ok(CategoryTotal {
                    category: parse_enum(0, &category)?,
                    amount: row.get(1)?,
                    transaction_count: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(DashboardSummary {
            total_income,
            total_expense,
            net_profit: total_income - total_expense,
            total_emergency_fund,
            first_date,
            last_date,
            daily,
            categories,
        })
    }

    /// Distinct months (1-12) and years that have transactions for a user
    pub fn get_available_periods(&self, username: &str) -> Result<AvailablePeriods> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT DISTINCT CAST(strftime('%m', date) AS INTEGER) AS month
            FROM transactions
            WHERE username = ?
            ORDER BY month
            "#,
        )?;
        let months = stmt
            .query_map(params![username], |row| row.get(0))?
            .collect::<std::result::Result<Vec<u32>, _>>()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT DISTINCT CAST(strftime('%Y', date) AS INTEGER) AS year
            FROM transactions
            WHERE username = ?
            ORDER BY year
            "#,
        )?;
        let years = stmt
            .query_map(params![username], |row| row.get(0))?
            .collect::<std::result::Result<Vec<i32>, _>>()?;

        Ok(AvailablePeriods { months, years })
    }
}
