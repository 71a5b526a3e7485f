//! Storage traits used by the account and ledger services
//!
//! [`Database`] implements both; services are generic so they can run
//! against any store that provides lookup, insert, update and delete.

use crate::db::Database;
use crate::error::Result;
use crate::models::{NewTransaction, Receipt, Transaction, TransactionFilter, TransactionUpdate, User};

/// Credential and profile storage
pub trait UserRepository {
    fn find_user(&self, username: &str) -> Result<Option<User>>;

    /// Stored password hash, if the user exists
    fn password_hash(&self, username: &str) -> Result<Option<String>>;

    /// Insert a user; fails with `Conflict` if the username is taken
    fn insert_user(&self, username: &str, password_hash: &str, display_name: &str) -> Result<User>;

    fn update_password_hash(&self, username: &str, password_hash: &str) -> Result<()>;

    fn update_display_name(&self, username: &str, display_name: &str) -> Result<()>;

    fn update_emergency_rate(&self, username: &str, rate: u8) -> Result<()>;

    /// Rename a user, carrying their transactions along
    fn rename_user(&self, username: &str, new_username: &str) -> Result<()>;

    fn profile_picture(&self, username: &str) -> Result<Option<Vec<u8>>>;

    /// Set or clear (`None`) the profile picture
    fn update_profile_picture(&self, username: &str, image: Option<&[u8]>) -> Result<()>;

    /// Delete a user and everything they own
    fn delete_user(&self, username: &str) -> Result<()>;
}

/// Transaction storage, always scoped to the owning user
pub trait TransactionRepository {
    fn insert_transaction(
        &self,
        username: &str,
        tx: &NewTransaction,
        emergency_fund: i64,
    ) -> Result<i64>;

    fn get_transaction(&self, username: &str, id: i64) -> Result<Option<Transaction>>;

    fn list_transactions(
        &self,
        username: &str,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>>;

    /// Returns false when no transaction with this id belongs to the user
    fn update_transaction(
        &self,
        username: &str,
        id: i64,
        update: &TransactionUpdate,
        emergency_fund: i64,
    ) -> Result<bool>;

    /// Returns false when no transaction with this id belongs to the user
    fn delete_transaction(&self, username: &str, id: i64) -> Result<bool>;

    fn receipt(&self, username: &str, id: i64) -> Result<Option<Receipt>>;
}

impl UserRepository for Database {
    fn find_user(&self, username: &str) -> Result<Option<User>> {
        Database::get_user(self, username)
    }

    fn password_hash(&self, username: &str) -> Result<Option<String>> {
        Database::get_password_hash(self, username)
    }

    fn insert_user(&self, username: &str, password_hash: &str, display_name: &str) -> Result<User> {
        Database::create_user(self, username, password_hash, display_name)
    }

    fn update_password_hash(&self, username: &str, password_hash: &str) -> Result<()> {
        Database::set_password_hash(self, username, password_hash)
    }

    fn update_display_name(&self, username: &str, display_name: &str) -> Result<()> {
        Database::set_display_name(self, username, display_name)
    }

    fn update_emergency_rate(&self, username: &str, rate: u8) -> Result<()> {
        Database::set_emergency_rate(self, username, rate)
    }

    fn rename_user(&self, username: &str, new_username: &str) -> Result<()> {
        Database::rename_user(self, username, new_username)
    }

    fn profile_picture(&self, username: &str) -> Result<Option<Vec<u8>>> {
        Database::get_profile_picture(self, username)
    }

    fn update_profile_picture(&self, username: &str, image: Option<&[u8]>) -> Result<()> {
        Database::set_profile_picture(self, username, image)
    }

    fn delete_user(&self, username: &str) -> Result<()> {
        Database::delete_user(self, username)
    }
}

impl TransactionRepository for Database {
    fn insert_transaction(
        &self,
        username: &str,
        tx: &NewTransaction,
        emergency_fund: i64,
    ) -> Result<i64> {
        Database::insert_transaction(self, username, tx, emergency_fund)
    }

    fn get_transaction(&self, username: &str, id: i64) -> Result<Option<Transaction>> {
        Database::get_transaction(self, username, id)
    }

    fn list_transactions(
        &self,
        username: &str,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>> {
        Database::list_transactions(self, username, filter)
    }

    fn update_transaction(
        &self,
        username: &str,
        id: i64,
        update: &TransactionUpdate,
        emergency_fund: i64,
    ) -> Result<bool> {
        Database::update_transaction(self, username, id, update, emergency_fund)
    }

    fn delete_transaction(&self, username: &str, id: i64) -> Result<bool> {
        Database::delete_transaction(self, username, id)
    }

    fn receipt(&self, username: &str, id: i64) -> Result<Option<Receipt>> {
        Database::get_receipt(self, username, id)
    }
}
