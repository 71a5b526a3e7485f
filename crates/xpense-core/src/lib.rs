//! Xpense Core Library
//!
//! Shared functionality for the Xpense finance tracker:
//! - Database access and migrations (SQLCipher via r2d2)
//! - User accounts with Argon2id password hashes
//! - Income/expense ledger with emergency fund set-asides and receipt images
//! - Dashboard aggregates over filtered transactions
//! - Time-series forecasting and plain-language forecast insights

pub mod accounts;
pub mod db;
pub mod error;
pub mod forecast;
pub mod ledger;
pub mod models;
pub mod repository;
pub mod service;

pub use accounts::AccountService;
pub use db::{AuditEntry, Database};
pub use error::{Error, Result};
pub use forecast::{
    forecast_for_user, generate_insights, AdditiveForecaster, ForecastPoint, ForecastResult,
    ForecastSeries, ForecastTarget, Forecaster, InsightReport,
};
pub use repository::{TransactionRepository, UserRepository};
pub use service::LedgerService;
