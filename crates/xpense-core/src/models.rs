//! Domain models for Xpense

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Whether money came in or went out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction kind: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transaction category; each category belongs to exactly one kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Business profit (income)
    Profit,
    Electricity,
    Salary,
    Water,
    RawMaterials,
    Rent,
    Other,
}

impl Category {
    pub const INCOME: &'static [Category] = &[Category::Profit];

    pub const EXPENSE: &'static [Category] = &[
        Category::Electricity,
        Category::Salary,
        Category::Water,
        Category::RawMaterials,
        Category::Rent,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Profit => "profit",
            Self::Electricity => "electricity",
            Self::Salary => "salary",
            Self::Water => "water",
            Self::RawMaterials => "raw_materials",
            Self::Rent => "rent",
            Self::Other => "other",
        }
    }

    /// The kind this category can be recorded under
    pub fn kind(&self) -> TransactionKind {
        match self {
            Self::Profit => TransactionKind::Income,
            _ => TransactionKind::Expense,
        }
    }

    /// Categories selectable for a given kind
    pub fn allowed_for(kind: TransactionKind) -> &'static [Category] {
        match kind {
            TransactionKind::Income => Self::INCOME,
            TransactionKind::Expense => Self::EXPENSE,
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "profit" => Ok(Self::Profit),
            "electricity" => Ok(Self::Electricity),
            "salary" => Ok(Self::Salary),
            "water" => Ok(Self::Water),
            "raw_materials" => Ok(Self::RawMaterials),
            "rent" => Ok(Self::Rent),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A registered user (never carries the password hash)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub display_name: String,
    /// Percentage of each income set aside as emergency fund (5-10)
    pub emergency_rate: u8,
    pub has_profile_picture: bool,
    pub created_at: DateTime<Utc>,
}

/// A recorded income or expense
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub username: String,
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub category: Category,
    pub amount: i64,
    /// Portion of an income reserved for emergencies (always 0 for expenses)
    pub emergency_fund: i64,
    pub note: Option<String>,
    pub has_receipt: bool,
    pub created_at: DateTime<Utc>,
}

/// New transaction for insertion
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub category: Category,
    pub amount: i64,
    pub note: Option<String>,
    /// Receipt image bytes (PNG or JPEG)
    pub receipt: Option<Vec<u8>>,
}

/// What to do with an existing receipt when editing a transaction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ReceiptChange {
    #[default]
    Keep,
    Remove,
    Replace(Vec<u8>),
}

/// Full replacement of a transaction's editable fields
#[derive(Debug, Clone)]
pub struct TransactionUpdate {
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub category: Category,
    pub amount: i64,
    pub note: Option<String>,
    pub receipt: ReceiptChange,
}

/// Stored receipt image
#[derive(Debug, Clone)]
pub struct Receipt {
    pub transaction_id: i64,
    pub image: Vec<u8>,
    /// SHA256 of the image bytes
    pub content_hash: String,
}

/// Period restriction applied to dashboards, history and forecasts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PeriodFilter {
    #[default]
    All,
    Day { date: NaiveDate },
    /// Calendar month regardless of year (1-12)
    Month { month: u32 },
    Year { year: i32 },
    Range { from: NaiveDate, to: NaiveDate },
}

/// Filters shared by the history list, the dashboard and forecasting
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionFilter {
    pub kind: Option<TransactionKind>,
    pub category: Option<Category>,
    #[serde(default)]
    pub period: PeriodFilter,
}

impl TransactionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: Option<TransactionKind>) -> Self {
        self.kind = kind;
        self
    }

    pub fn category(mut self, category: Option<Category>) -> Self {
        self.category = category;
        self
    }

    pub fn period(mut self, period: PeriodFilter) -> Self {
        self.period = period;
        self
    }
}

/// Income and expense totals for one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTotals {
    pub date: NaiveDate,
    pub income: i64,
    pub expense: i64,
}

/// Total amount recorded under one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub amount: i64,
    pub transaction_count: i64,
}

/// Dashboard aggregates for a filtered set of transactions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_income: i64,
    pub total_expense: i64,
    pub net_profit: i64,
    pub total_emergency_fund: i64,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub daily: Vec<DailyTotals>,
    pub categories: Vec<CategoryTotal>,
}

/// Months and years that have data, for filter pickers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AvailablePeriods {
    pub months: Vec<u32>,
    pub years: Vec<i32>,
}
