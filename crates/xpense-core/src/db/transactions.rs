//! Transaction operations

use rusqlite::{params, OptionalExtension, Row};

use super::transaction_filter::SqlFilter;
use super::{parse_date, parse_datetime, parse_enum, Database};
use crate::error::Result;
use crate::ledger::content_hash;
use crate::models::{
    NewTransaction, Receipt, ReceiptChange, Transaction, TransactionFilter, TransactionUpdate,
};

const TRANSACTION_COLUMNS: &str = r#"
    t.id, t.username, t.date, t.kind, t.category, t.amount, t.emergency_fund,
    t.note, t.receipt_image IS NOT NULL, t.created_at
"#;

fn row_to_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let date: String = row.get(2)?;
    let kind: String = row.get(3)?;
    let category: String = row.get(4)?;
    let created_at: String = row.get(9)?;

    Ok(Transaction {
        id: row.get(0)?,
        username: row.get(1)?,
        date: parse_date(2, &date)?,
        kind: parse_enum(3, &kind)?,
        category: parse_enum(4, &category)?,
        amount: row.get(5)?,
        emergency_fund: row.get(6)?,
        note: row.get(7)?,
        has_receipt: row.get(8)?,
        created_at: parse_datetime(&created_at),
    })
}

/// Blank notes are stored as NULL
fn normalize_note(note: &Option<String>) -> Option<&str> {
    note.as_deref().map(str::trim).filter(|n| !n.is_empty())
}

impl Database {
    /// Insert a transaction for a user
    pub fn insert_transaction(
        &self,
        username: &str,
        tx: &NewTransaction,
        emergency_fund: i64,
    ) -> Result<i64> {
        let conn = self.conn()?;
        let receipt_hash = tx.receipt.as_deref().map(content_hash);

        conn.execute(
            r#"
            INSERT INTO transactions
                (username, date, kind, category, amount, emergency_fund, note, receipt_image, receipt_hash)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                username,
                tx.date.to_string(),
                tx.kind.as_str(),
                tx.category.as_str(),
                tx.amount,
                emergency_fund,
                normalize_note(&tx.note),
                tx.receipt.as_deref(),
                receipt_hash,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Get a transaction by ID, only if it belongs to `username`
    pub fn get_transaction(&self, username: &str, id: i64) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM transactions t WHERE t.id = ? AND t.username = ?",
            TRANSACTION_COLUMNS
        );
        let tx = conn
            .query_row(&sql, params![id, username], row_to_transaction)
            .optional()?;
        Ok(tx)
    }

    /// List a user's transactions matching `filter`, newest first
    pub fn list_transactions(
        &self,
        username: &str,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let built = SqlFilter::for_user(username).apply(filter).build();
        let sql = format!(
            "SELECT {} FROM transactions t {} {}",
            TRANSACTION_COLUMNS, built.where_clause, built.order_clause
        );

        let mut stmt = conn.prepare(&sql)?;
        let transactions = stmt
            .query_map(built.params_refs().as_slice(), row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// Count a user's transactions matching `filter`
    pub fn count_transactions(&self, username: &str, filter: &TransactionFilter) -> Result<i64> {
        let conn = self.conn()?;
        let built = SqlFilter::for_user(username).apply(filter).build();
        let sql = format!("SELECT COUNT(*) FROM transactions t {}", built.where_clause);
        let count = conn.query_row(&sql, built.params_refs().as_slice(), |row| row.get(0))?;
        Ok(count)
    }

    /// Replace a transaction's editable fields
    ///
    /// Returns false when the transaction does not exist or belongs to someone else.
    pub fn update_transaction(
        &self,
        username: &str,
        id: i64,
        update: &TransactionUpdate,
        emergency_fund: i64,
    ) -> Result<bool> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let rows = tx.execute(
            r#"
            UPDATE transactions
            SET date = ?, kind = ?, category = ?, amount = ?, emergency_fund = ?, note = ?
            WHERE id = ? AND username = ?
            "#,
            params![
                update.date.to_string(),
                update.kind.as_str(),
                update.category.as_str(),
                update.amount,
                emergency_fund,
                normalize_note(&update.note),
                id,
                username,
            ],
        )?;

        if rows == 0 {
            return Ok(false);
        }

        match &update.receipt {
            ReceiptChange::Keep => {}
            ReceiptChange::Remove => {
                tx.execute(
                    "UPDATE transactions SET receipt_image = NULL, receipt_hash = NULL WHERE id = ?",
                    params![id],
                )?;
            }
            ReceiptChange::Replace(image) => {
                tx.execute(
                    "UPDATE transactions SET receipt_image = ?, receipt_hash = ? WHERE id = ?",
                    params![image, content_hash(image), id],
                )?;
            }
        }

        tx.commit()?;
        Ok(true)
    }

    /// Delete a transaction; returns false when nothing of the user's matched
    pub fn delete_transaction(&self, username: &str, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let rows = conn.execute(
            "DELETE FROM transactions WHERE id = ? AND username = ?",
            params![id, username],
        )?;
        Ok(rows > 0)
    }

    /// Get the receipt image attached to a transaction
    pub fn get_receipt(&self, username: &str, id: i64) -> Result<Option<Receipt>> {
        let conn = self.conn()?;
        let receipt = conn
            .query_row(
                r#"
                SELECT id, receipt_image, receipt_hash
                FROM transactions
                WHERE id = ? AND username = ? AND receipt_image IS NOT NULL
                "#,
                params![id, username],
                |row| {
                    let image: Vec<u8> = row.get(1)?;
                    let stored_hash: Option<String> = row.get(2)?;
                    Ok(Receipt {
                        transaction_id: row.get(0)?,
                        content_hash: stored_hash.unwrap_or_else(|| content_hash(&image)),
                        image,
                    })
                },
            )
            .optional()?;
        Ok(receipt)
    }
}
