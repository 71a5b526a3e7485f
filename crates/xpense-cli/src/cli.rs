//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use xpense_core::forecast::{ForecastTarget, DEFAULT_HORIZON};
use xpense_core::models::{Category, TransactionKind};

/// Xpense - Income, expense and forecast tracking for small businesses
#[derive(Parser)]
#[command(name = "xpense")]
#[command(about = "Self-hosted income and expense tracker with forecasting", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "xpense.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set XPENSE_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Show database status (encryption, size, users)
    Status,

    /// Create a user account
    Register {
        username: String,

        /// Password (falls back to XPENSE_PASSWORD)
        #[arg(long)]
        password: Option<String>,
    },

    /// List user accounts
    Users,

    /// Record an income or expense
    Add {
        /// Acting user
        #[arg(short, long)]
        user: String,

        /// income or expense
        #[arg(short, long)]
        kind: TransactionKind,

        /// profit, electricity, salary, water, raw_materials, rent, other
        #[arg(short, long)]
        category: Category,

        /// Amount in rupiah; thousands separators are allowed (1.500.000)
        #[arg(short, long)]
        amount: String,

        /// Transaction date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Free-text note
        #[arg(short, long)]
        note: Option<String>,

        /// Receipt image (PNG or JPEG)
        #[arg(long)]
        receipt: Option<PathBuf>,
    },

    /// Manage transactions (list, delete, receipt)
    Transactions {
        #[command(subcommand)]
        action: TransactionsAction,
    },

    /// Show dashboard summary
    Dashboard {
        #[arg(short, long)]
        user: String,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Forecast income, expense or net profit and explain the outlook
    Forecast {
        #[arg(short, long)]
        user: String,

        /// income, expense or net_profit
        #[arg(short, long, default_value = "net_profit")]
        target: ForecastTarget,

        /// Days to forecast (1-365)
        #[arg(long, default_value_t = DEFAULT_HORIZON)]
        horizon: usize,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Change account settings
    Settings {
        #[arg(short, long)]
        user: String,

        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Show the audit log
    Audit {
        /// Only entries for this user
        #[arg(short, long)]
        user: Option<String>,

        #[arg(short, long, default_value = "50")]
        limit: i64,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory containing static files to serve (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,

        /// Hours of inactivity before a login session expires
        #[arg(long, default_value = "12")]
        session_hours: u64,
    },
}

#[derive(Subcommand)]
pub enum TransactionsAction {
    /// List transactions, newest first
    List {
        #[arg(short, long)]
        user: String,

        #[arg(short, long, default_value = "20")]
        limit: usize,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Delete a transaction
    Delete {
        #[arg(short, long)]
        user: String,

        id: i64,
    },

    /// Save a transaction's receipt image to a file
    Receipt {
        #[arg(short, long)]
        user: String,

        id: i64,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Show the profile
    Show,

    /// Set the display name
    DisplayName { name: String },

    /// Rename the account (transactions move with it)
    Rename { new_username: String },

    /// Change the password
    Password {
        #[arg(long)]
        current: String,

        #[arg(long)]
        new: String,
    },

    /// Percentage of each income set aside as emergency fund (5-10)
    EmergencyRate { rate: u8 },

    /// Set the profile picture from a PNG or JPEG file
    Photo { file: PathBuf },

    /// Remove the profile picture
    RemovePhoto,

    /// Delete the account and all of its transactions
    Delete {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

/// Filters shared by list, dashboard and forecast
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Only income or only expense (ignored by forecast)
    #[arg(long)]
    pub kind: Option<TransactionKind>,

    #[arg(long)]
    pub category: Option<Category>,

    /// A single day (YYYY-MM-DD)
    #[arg(long, conflicts_with_all = ["month", "year", "from", "to"])]
    pub day: Option<NaiveDate>,

    /// A calendar month in any year (1-12)
    #[arg(long, conflicts_with_all = ["year", "from", "to"])]
    pub month: Option<u32>,

    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub year: Option<i32>,

    /// Range start (YYYY-MM-DD), requires --to
    #[arg(long, requires = "to")]
    pub from: Option<NaiveDate>,

    /// Range end (YYYY-MM-DD), requires --from
    #[arg(long, requires = "from")]
    pub to: Option<NaiveDate>,
}
