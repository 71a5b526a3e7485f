//! Xpense CLI - Income and expense tracking with forecasts
//!
//! Usage:
//!   xpense init                          Initialize database
//!   xpense register alice                Create an account
//!   xpense add -u alice -k income ...    Record a transaction
//!   xpense forecast -u alice             Forecast net profit with insights
//!   xpense serve --port 3000             Start web server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Status => commands::cmd_status(&cli.db, cli.no_encrypt),
        Commands::Register { username, password } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let password = commands::resolve_password(password)?;
            commands::cmd_register(&db, &username, &password)
        }
        Commands::Users => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_users(&db)
        }
        Commands::Add {
            user,
            kind,
            category,
            amount,
            date,
            note,
            receipt,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_add(
                &db,
                &user,
                commands::AddArgs {
                    kind,
                    category,
                    amount: &amount,
                    date,
                    note,
                    receipt: receipt.as_deref(),
                },
            )
            .map(|_| ())
        }
        Commands::Transactions { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                TransactionsAction::List {
                    user,
                    limit,
                    filter,
                } => commands::cmd_transactions_list(&db, &user, &filter, limit),
                TransactionsAction::Delete { user, id } => {
                    commands::cmd_transactions_delete(&db, &user, id)
                }
                TransactionsAction::Receipt { user, id, output } => {
                    commands::cmd_transactions_receipt(&db, &user, id, &output)
                }
            }
        }
        Commands::Dashboard { user, filter } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_dashboard(&db, &user, &filter)
        }
        Commands::Forecast {
            user,
            target,
            horizon,
            json,
            filter,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_forecast(&db, &user, &filter, target, horizon, json).map(|_| ())
        }
        Commands::Settings { user, action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_settings(&db, &user, action)
        }
        Commands::Audit { user, limit } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_audit(&db, user.as_deref(), limit)
        }
        Commands::Serve {
            port,
            host,
            static_dir,
            session_hours,
        } => {
            commands::cmd_serve(
                &cli.db,
                &host,
                port,
                cli.no_encrypt,
                static_dir.as_deref(),
                session_hours,
            )
            .await
        }
    }
}
