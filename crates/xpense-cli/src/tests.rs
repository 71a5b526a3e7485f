//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use chrono::{Duration, NaiveDate};
use clap::Parser;
use xpense_core::db::Database;
use xpense_core::forecast::ForecastTarget;
use xpense_core::models::{Category, PeriodFilter, TransactionKind};

use crate::cli::{Cli, Commands, FilterArgs, SettingsAction};
use crate::commands::{self, truncate, AddArgs};

const PNG: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n', 0, 0];

fn setup_test_db() -> Database {
    let db = Database::in_memory().unwrap();
    commands::cmd_register(&db, "alice", "secret").unwrap();
    db
}

fn add(db: &Database, date: NaiveDate, kind: TransactionKind, category: Category, amount: &str) -> i64 {
    commands::cmd_add(
        db,
        "alice",
        AddArgs {
            kind,
            category,
            amount,
            date: Some(date),
            note: None,
            receipt: None,
        },
    )
    .unwrap()
    .id
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, d).unwrap()
}

fn count_rows(db: &Database) -> i64 {
    let conn = db.conn().unwrap();
    conn.query_row(
        "SELECT COUNT(*) FROM transactions WHERE username = ?1",
        rusqlite::params!["alice"],
        |row| row.get(0),
    )
    .unwrap()
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_parse_add_command() {
    let cli = Cli::try_parse_from([
        "xpense", "add", "-u", "alice", "-k", "income", "-c", "profit", "-a", "1.500.000", "-d",
        "2024-04-01",
    ])
    .unwrap();

    match cli.command {
        Commands::Add {
            kind,
            category,
            amount,
            date,
            ..
        } => {
            assert_eq!(kind, TransactionKind::Income);
            assert_eq!(category, Category::Profit);
            assert_eq!(amount, "1.500.000");
            assert_eq!(date, Some(day(1)));
        }
        _ => panic!("expected add"),
    }
}

#[test]
fn test_parse_forecast_defaults() {
    let cli = Cli::try_parse_from(["xpense", "forecast", "-u", "alice"]).unwrap();
    match cli.command {
        Commands::Forecast {
            target, horizon, ..
        } => {
            assert_eq!(target, ForecastTarget::NetProfit);
            assert_eq!(horizon, 30);
        }
        _ => panic!("expected forecast"),
    }
}

#[test]
fn test_parse_rejects_conflicting_periods() {
    let result = Cli::try_parse_from([
        "xpense", "dashboard", "-u", "alice", "--month", "3", "--year", "2024",
    ]);
    assert!(result.is_err());

    let result = Cli::try_parse_from(["xpense", "dashboard", "-u", "alice", "--from", "2024-01-01"]);
    assert!(result.is_err());
}

// ========== Filter Tests ==========

#[test]
fn test_build_filter() {
    let filter = commands::build_filter(&FilterArgs::default()).unwrap();
    assert_eq!(filter.period, PeriodFilter::All);

    let args = FilterArgs {
        kind: Some(TransactionKind::Expense),
        month: Some(4),
        ..Default::default()
    };
    let filter = commands::build_filter(&args).unwrap();
    assert_eq!(filter.kind, Some(TransactionKind::Expense));
    assert_eq!(filter.period, PeriodFilter::Month { month: 4 });

    let args = FilterArgs {
        month: Some(0),
        ..Default::default()
    };
    assert!(commands::build_filter(&args).is_err());

    let args = FilterArgs {
        from: Some(day(10)),
        to: Some(day(1)),
        ..Default::default()
    };
    assert!(commands::build_filter(&args).is_err());
}

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a long market note", 10), "a long ...");
}

// ========== Account Command Tests ==========

#[test]
fn test_cmd_register_duplicate() {
    let db = setup_test_db();
    assert!(commands::cmd_register(&db, "alice", "other").is_err());
    assert!(commands::cmd_users(&db).is_ok());
}

#[test]
fn test_resolve_password_prefers_flag() {
    assert_eq!(
        commands::resolve_password(Some("flag".to_string())).unwrap(),
        "flag"
    );
}

// ========== Transaction Command Tests ==========

#[test]
fn test_cmd_add_and_list() {
    let db = setup_test_db();
    add(&db, day(1), TransactionKind::Income, Category::Profit, "1.000.000");
    add(&db, day(2), TransactionKind::Expense, Category::Water, "50,000");
    assert_eq!(count_rows(&db), 2);

    assert!(commands::cmd_transactions_list(&db, "alice", &FilterArgs::default(), 20).is_ok());

    let tx = db.list_transactions("alice", &Default::default()).unwrap();
    assert_eq!(tx[0].amount, 50_000);
    assert_eq!(tx[1].emergency_fund, 100_000);
}

#[test]
fn test_cmd_add_rejects_bad_input() {
    let db = setup_test_db();
    let result = commands::cmd_add(
        &db,
        "alice",
        AddArgs {
            kind: TransactionKind::Expense,
            category: Category::Profit,
            amount: "1000",
            date: Some(day(1)),
            note: None,
            receipt: None,
        },
    );
    assert!(result.is_err());

    let result = commands::cmd_add(
        &db,
        "alice",
        AddArgs {
            kind: TransactionKind::Expense,
            category: Category::Rent,
            amount: "lots",
            date: Some(day(1)),
            note: None,
            receipt: None,
        },
    );
    assert!(result.is_err());
    assert_eq!(count_rows(&db), 0);
}

#[test]
fn test_cmd_receipt_roundtrip_through_files() {
    let db = setup_test_db();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("receipt.png");
    std::fs::write(&input, PNG).unwrap();

    let tx = commands::cmd_add(
        &db,
        "alice",
        AddArgs {
            kind: TransactionKind::Expense,
            category: Category::Electricity,
            amount: "250000",
            date: Some(day(3)),
            note: Some("April bill".to_string()),
            receipt: Some(input.as_path()),
        },
    )
    .unwrap();
    assert!(tx.has_receipt);

    let output = dir.path().join("out.png");
    commands::cmd_transactions_receipt(&db, "alice", tx.id, &output).unwrap();
    assert_eq!(std::fs::read(&output).unwrap(), PNG);
}

#[test]
fn test_cmd_delete() {
    let db = setup_test_db();
    let id = add(&db, day(1), TransactionKind::Income, Category::Profit, "1000");

    commands::cmd_transactions_delete(&db, "alice", id).unwrap();
    assert_eq!(count_rows(&db), 0);
    assert!(commands::cmd_transactions_delete(&db, "alice", id).is_err());
}

// ========== Report Command Tests ==========

#[test]
fn test_cmd_dashboard() {
    let db = setup_test_db();
    assert!(commands::cmd_dashboard(&db, "alice", &FilterArgs::default()).is_ok());

    add(&db, day(1), TransactionKind::Income, Category::Profit, "1000");
    assert!(commands::cmd_dashboard(&db, "alice", &FilterArgs::default()).is_ok());
}

#[test]
fn test_cmd_forecast() {
    let db = setup_test_db();
    let start = day(1);
    for i in 0..20 {
        add(
            &db,
            start + Duration::days(i),
            TransactionKind::Income,
            Category::Profit,
            &(200_000 + i * 5_000).to_string(),
        );
    }

    let result = commands::cmd_forecast(
        &db,
        "alice",
        &FilterArgs::default(),
        ForecastTarget::Income,
        14,
        false,
    )
    .unwrap();
    assert_eq!(result.observed_days, 20);
    assert_eq!(result.insights.len(), 3);
    assert_eq!(result.series.future(14).len(), 14);

    // too few days in a single-day window
    let one_day = FilterArgs {
        day: Some(start),
        ..Default::default()
    };
    assert!(commands::cmd_forecast(&db, "alice", &one_day, ForecastTarget::Income, 7, true).is_err());
}

#[test]
fn test_cmd_audit() {
    let db = setup_test_db();
    add(&db, day(1), TransactionKind::Income, Category::Profit, "1000");
    assert!(commands::cmd_audit(&db, Some("alice"), 10).is_ok());

    let entries = db.list_audit_log(Some("alice"), 10).unwrap();
    assert!(entries.iter().any(|e| e.action == "register"));
    assert!(entries.iter().any(|e| e.action == "create"));
}

// ========== Settings Command Tests ==========

#[test]
fn test_cmd_settings() {
    let db = setup_test_db();

    commands::cmd_settings(&db, "alice", SettingsAction::EmergencyRate { rate: 7 }).unwrap();
    let id = add(&db, day(1), TransactionKind::Income, Category::Profit, "1.000.000");
    assert_eq!(
        db.get_transaction("alice", id).unwrap().unwrap().emergency_fund,
        70_000
    );
    assert!(commands::cmd_settings(&db, "alice", SettingsAction::EmergencyRate { rate: 11 }).is_err());

    commands::cmd_settings(
        &db,
        "alice",
        SettingsAction::DisplayName {
            name: "Alice's Warung".to_string(),
        },
    )
    .unwrap();
    assert_eq!(
        db.get_user("alice").unwrap().unwrap().display_name,
        "Alice's Warung"
    );
    assert!(commands::cmd_settings(&db, "alice", SettingsAction::Show).is_ok());
}

#[test]
fn test_cmd_settings_rename_and_delete() {
    let db = setup_test_db();
    add(&db, day(1), TransactionKind::Income, Category::Profit, "1000");

    commands::cmd_settings(
        &db,
        "alice",
        SettingsAction::Rename {
            new_username: "alicia".to_string(),
        },
    )
    .unwrap();
    assert_eq!(db.list_transactions("alicia", &Default::default()).unwrap().len(), 1);

    // refuses without confirmation
    assert!(commands::cmd_settings(&db, "alicia", SettingsAction::Delete { yes: false }).is_err());
    assert!(db.get_user("alicia").unwrap().is_some());

    commands::cmd_settings(&db, "alicia", SettingsAction::Delete { yes: true }).unwrap();
    assert!(db.get_user("alicia").unwrap().is_none());
}

#[test]
fn test_cmd_settings_password() {
    let db = setup_test_db();
    assert!(commands::cmd_settings(
        &db,
        "alice",
        SettingsAction::Password {
            current: "wrong".to_string(),
            new: "next".to_string(),
        }
    )
    .is_err());

    commands::cmd_settings(
        &db,
        "alice",
        SettingsAction::Password {
            current: "secret".to_string(),
            new: "next".to_string(),
        },
    )
    .unwrap();
    assert!(xpense_core::AccountService::new(&db)
        .authenticate("alice", "next")
        .is_ok());
}
