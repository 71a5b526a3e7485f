//! Transaction command implementations

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use xpense_core::db::Database;
use xpense_core::ledger::{format_rupiah, parse_amount};
use xpense_core::models::{Category, NewTransaction, Transaction, TransactionKind};
use xpense_core::LedgerService;

use super::{build_filter, truncate};
use crate::cli::FilterArgs;

/// Fields of `xpense add`
pub struct AddArgs<'a> {
    pub kind: TransactionKind,
    pub category: Category,
    pub amount: &'a str,
    pub date: Option<NaiveDate>,
    pub note: Option<String>,
    pub receipt: Option<&'a Path>,
}

pub fn cmd_add(db: &Database, username: &str, args: AddArgs<'_>) -> Result<Transaction> {
    let receipt = args
        .receipt
        .map(|path| {
            std::fs::read(path)
                .with_context(|| format!("Failed to read receipt {}", path.display()))
        })
        .transpose()?;

    let tx = LedgerService::new(db).record(
        username,
        NewTransaction {
            date: args.date.unwrap_or_else(|| Local::now().date_naive()),
            kind: args.kind,
            category: args.category,
            amount: parse_amount(args.amount)?,
            note: args.note,
            receipt,
        },
    )?;

    db.log_audit(
        username,
        "create",
        Some("transaction"),
        Some(tx.id),
        Some(&format!("{} {} {} (cli)", tx.kind, tx.category, tx.amount)),
    )?;

    println!(
        "✅ Recorded {} #{}: {} {}",
        tx.kind,
        tx.id,
        tx.category,
        format_rupiah(tx.amount as f64)
    );
    if tx.emergency_fund > 0 {
        println!(
            "   🛟 Emergency fund set aside: {}",
            format_rupiah(tx.emergency_fund as f64)
        );
    }

    Ok(tx)
}

pub fn cmd_transactions_list(
    db: &Database,
    username: &str,
    filter: &FilterArgs,
    limit: usize,
) -> Result<()> {
    let filter = build_filter(filter)?;
    let transactions = LedgerService::new(db).list(username, &filter)?;

    if transactions.is_empty() {
        println!("No transactions found. Record one with:");
        println!("  xpense add -u {} -k income -c profit -a 100000", username);
        return Ok(());
    }

    println!();
    println!("📝 Transactions ({} total)", transactions.len());
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions.iter().take(limit) {
        let amount_str = match tx.kind {
            TransactionKind::Expense => {
                format!("\x1b[31m-{}\x1b[0m", format_rupiah(tx.amount as f64)) // Red for expenses
            }
            TransactionKind::Income => {
                format!("\x1b[32m+{}\x1b[0m", format_rupiah(tx.amount as f64)) // Green for income
            }
        };

        println!(
            "   {:>5} │ {} │ {:<13} │ {:>16} │ {}{}",
            tx.id,
            tx.date,
            tx.category,
            amount_str,
            truncate(tx.note.as_deref().unwrap_or(""), 30),
            if tx.has_receipt { " 🧾" } else { "" }
        );
    }

    Ok(())
}

pub fn cmd_transactions_delete(db: &Database, username: &str, id: i64) -> Result<()> {
    LedgerService::new(db).delete(username, id)?;
    db.log_audit(username, "delete", Some("transaction"), Some(id), Some("cli"))?;
    println!("🗑️  Deleted transaction #{}", id);
    Ok(())
}

pub fn cmd_transactions_receipt(
    db: &Database,
    username: &str,
    id: i64,
    output: &Path,
) -> Result<()> {
    let receipt = LedgerService::new(db).receipt(username, id)?;
    std::fs::write(output, &receipt.image)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!(
        "🧾 Saved receipt for #{} to {} ({} bytes)",
        id,
        output.display(),
        receipt.image.len()
    );
    Ok(())
}
