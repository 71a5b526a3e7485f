//! Filter builder for constructing dynamic SQL over the transactions table
//!
//! Shared by the history list, the dashboard aggregates and forecasting so
//! all three agree on what a filter selects.

use crate::models::{Category, PeriodFilter, TransactionFilter, TransactionKind};

/// Builder for the WHERE clause of a per-user transaction query
///
/// The transactions table is always aliased as `t`.
pub struct SqlFilter<'query> {
    username: &'query str,
    kind: Option<TransactionKind>,
    category: Option<Category>,
    period: PeriodFilter,
    ascending: bool,
}

/// Result of building a filter - contains SQL components and parameters
pub struct FilterResult {
    /// WHERE clause including "WHERE" keyword (always scoped to the user)
    pub where_clause: String,
    /// ORDER BY clause including "ORDER BY" keyword
    pub order_clause: String,
    /// Parameters for the query (boxed for rusqlite compatibility)
    pub params: Vec<Box<dyn rusqlite::ToSql>>,
}

impl<'query> SqlFilter<'query> {
    /// Start a filter for one user's transactions
    pub fn for_user(username: &'query str) -> Self {
        Self {
            username,
            kind: None,
            category: None,
            period: PeriodFilter::All,
            ascending: false,
        }
    }

    /// Apply the user-facing filter fields
    pub fn apply(mut self, filter: &TransactionFilter) -> Self {
        self.kind = filter.kind;
        self.category = filter.category;
        self.period = filter.period;
        self
    }

    pub fn kind(mut self, kind: Option<TransactionKind>) -> Self {
        self.kind = kind;
        self
    }

    /// Oldest first instead of newest first
    pub fn ascending(mut self, value: bool) -> Self {
        self.ascending = value;
        self
    }

    /// Build the filter components
    pub fn build(self) -> FilterResult {
        let mut conditions = vec!["t.username = ?".to_string()];
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(self.username.to_string())];

        if let Some(kind) = self.kind {
            conditions.push("t.kind = ?".to_string());
            params.push(Box::new(kind.as_str()));
        }

        if let Some(category) = self.category {
            conditions.push("t.category = ?".to_string());
            params.push(Box::new(category.as_str()));
        }

        match self.period {
            PeriodFilter::All => {}
            PeriodFilter::Day { date } => {
                conditions.push("t.date = ?".to_string());
                params.push(Box::new(date.to_string()));
            }
            PeriodFilter::Month { month } => {
                conditions.push("CAST(strftime('%m', t.date) AS INTEGER) = ?".to_string());
                params.push(Box::new(month));
            }
            PeriodFilter::Year { year } => {
                conditions.push("CAST(strftime('%Y', t.date) AS INTEGER) = ?".to_string());
                params.push(Box::new(year));
            }
            PeriodFilter::Range { from, to } => {
                conditions.push("t.date >= ? AND t.date <= ?".to_string());
                params.push(Box::new(from.to_string()));
                params.push(Box::new(to.to_string()));
            }
        }

        let where_clause = format!("WHERE {}", conditions.join(" AND "));

        let order_dir = if self.ascending { "ASC" } else { "DESC" };
        let order_clause = format!("ORDER BY t.date {}, t.id {}", order_dir, order_dir);

        FilterResult {
            where_clause,
            order_clause,
            params,
        }
    }
}

impl FilterResult {
    /// Get parameter references for query execution
    pub fn params_refs(&self) -> Vec<&dyn rusqlite::ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_user_scope_always_present() {
        let result = SqlFilter::for_user("alice").build();
        assert_eq!(result.where_clause, "WHERE t.username = ?");
        assert_eq!(result.params.len(), 1);
        assert_eq!(result.order_clause, "ORDER BY t.date DESC, t.id DESC");
    }

    #[test]
    fn test_all_conditions() {
        let filter = TransactionFilter::new()
            .kind(Some(TransactionKind::Expense))
            .category(Some(Category::Rent))
            .period(PeriodFilter::Range {
                from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                to: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            });
        let result = SqlFilter::for_user("alice")
            .apply(&filter)
            .ascending(true)
            .build();

        assert!(result.where_clause.contains("t.kind = ?"));
        assert!(result.where_clause.contains("t.category = ?"));
        assert!(result.where_clause.contains("t.date >= ? AND t.date <= ?"));
        assert_eq!(result.params.len(), 5);
        assert_eq!(result.order_clause, "ORDER BY t.date ASC, t.id ASC");
    }

    #[test]
    fn test_month_and_year() {
        let month = SqlFilter::for_user("a")
            .apply(&TransactionFilter::new().period(PeriodFilter::Month { month: 3 }))
            .build();
        assert!(month.where_clause.contains("strftime('%m'"));

        let year = SqlFilter::for_user("a")
            .apply(&TransactionFilter::new().period(PeriodFilter::Year { year: 2024 }))
            .build();
        assert!(year.where_clause.contains("strftime('%Y'"));
        assert_eq!(year.params_refs().len(), 2);
    }
}
