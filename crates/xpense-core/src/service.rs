//! Transaction recording on top of the repositories
//!
//! Every call is scoped to the acting user: another user's transaction is
//! reported as not found.

use tracing::info;

use crate::error::{Error, Result};
use crate::ledger::{emergency_fund, validate_amount, validate_category, validate_image};
use crate::models::{
    NewTransaction, Receipt, ReceiptChange, Transaction, TransactionFilter, TransactionUpdate,
};
use crate::repository::{TransactionRepository, UserRepository};

pub struct LedgerService<'a, R: UserRepository + TransactionRepository + ?Sized> {
    repo: &'a R,
}

impl<'a, R: UserRepository + TransactionRepository + ?Sized> LedgerService<'a, R> {
    pub fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    fn emergency_rate(&self, username: &str) -> Result<u8> {
        self.repo
            .find_user(username)?
            .map(|u| u.emergency_rate)
            .ok_or_else(|| Error::NotFound(format!("User '{}'", username)))
    }

    /// Record a new transaction, computing its emergency fund from the user's rate
    pub fn record(&self, username: &str, tx: NewTransaction) -> Result<Transaction> {
        validate_amount(tx.amount)?;
        validate_category(tx.kind, tx.category)?;
        if let Some(receipt) = &tx.receipt {
            validate_image(receipt)?;
        }

        let rate = self.emergency_rate(username)?;
        let fund = emergency_fund(tx.amount, tx.kind, rate);
        let id = self.repo.insert_transaction(username, &tx, fund)?;

        info!(
            username,
            id,
            kind = tx.kind.as_str(),
            amount = tx.amount,
            emergency_fund = fund,
            "Recorded transaction"
        );
        self.get(username, id)
    }

    pub fn get(&self, username: &str, id: i64) -> Result<Transaction> {
        self.repo
            .get_transaction(username, id)?
            .ok_or_else(|| Error::NotFound(format!("Transaction {}", id)))
    }

    pub fn list(&self, username: &str, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        self.repo.list_transactions(username, filter)
    }

    /// Replace a transaction's fields; the emergency fund uses the current rate
    pub fn update(&self, username: &str, id: i64, update: TransactionUpdate) -> Result<Transaction> {
        validate_amount(update.amount)?;
        validate_category(update.kind, update.category)?;
        if let ReceiptChange::Replace(image) = &update.receipt {
            validate_image(image)?;
        }

        let rate = self.emergency_rate(username)?;
        let fund = emergency_fund(update.amount, update.kind, rate);
        if !self.repo.update_transaction(username, id, &update, fund)? {
            return Err(Error::NotFound(format!("Transaction {}", id)));
        }

        info!(username, id, "Updated transaction");
        self.get(username, id)
    }

    pub fn delete(&self, username: &str, id: i64) -> Result<()> {
        if !self.repo.delete_transaction(username, id)? {
            return Err(Error::NotFound(format!("Transaction {}", id)));
        }
        info!(username, id, "Deleted transaction");
        Ok(())
    }

    pub fn receipt(&self, username: &str, id: i64) -> Result<Receipt> {
        self.repo
            .receipt(username, id)?
            .ok_or_else(|| Error::NotFound(format!("Receipt for transaction {}", id)))
    }
}
