//! User operations

use rusqlite::{params, OptionalExtension};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::User;

/// Map a UNIQUE/PRIMARY KEY violation on the username to a conflict
fn username_conflict(err: rusqlite::Error, username: &str) -> Error {
    match err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation => {
            Error::Conflict(format!("Username '{}' is already taken", username))
        }
        other => Error::Database(other),
    }
}

fn ensure_user_updated(rows: usize, username: &str) -> Result<()> {
    if rows == 0 {
        return Err(Error::NotFound(format!("User '{}'", username)));
    }
    Ok(())
}

impl Database {
    /// Create a user with an already-hashed password
    pub fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        display_name: &str,
    ) -> Result<User> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO users (username, password_hash, display_name) VALUES (?, ?, ?)",
            params![username, password_hash, display_name],
        )
        .map_err(|e| username_conflict(e, username))?;

        drop(conn);
        self.get_user(username)?
            .ok_or_else(|| Error::NotFound(format!("User '{}'", username)))
    }

    /// Get a user by username
    pub fn get_user(&self, username: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                r#"
                SELECT username, display_name, emergency_rate,
                       profile_picture IS NOT NULL, created_at
                FROM users
                WHERE username = ?
                "#,
                params![username],
                |row| {
                    let created_at: String = row.get(4)?;
                    Ok(User {
                        username: row.get(0)?,
                        display_name: row.get(1)?,
                        emergency_rate: row.get(2)?,
                        has_profile_picture: row.get(3)?,
                        created_at: parse_datetime(&created_at),
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    /// List all users, ordered by username
    pub fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT username, display_name, emergency_rate,
                   profile_picture IS NOT NULL, created_at
            FROM users
            ORDER BY username
            "#,
        )?;

        let users = stmt
            .query_map([], |row| {
                let created_at: String = row.get(4)?;
                Ok(User {
                    username: row.get(0)?,
                    display_name: row.get(1)?,
                    emergency_rate: row.get(2)?,
                    has_profile_picture: row.get(3)?,
                    created_at: parse_datetime(&created_at),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(users)
    }

    pub fn get_password_hash(&self, username: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let hash = conn
            .query_row(
                "SELECT password_hash FROM users WHERE username = ?",
                params![username],
                |row| row.get(0),
            )
            .optional()?;
        Ok(hash)
    }

    pub fn set_password_hash(&self, username: &str, password_hash: &str) -> Result<()> {
        let conn = self.conn()?;
        let rows = conn.execute(
            "UPDATE users SET password_hash = ? WHERE username = ?",
            params![password_hash, username],
        )?;
        ensure_user_updated(rows, username)
    }

    pub fn set_display_name(&self, username: &str, display_name: &str) -> Result<()> {
        let conn = self.conn()?;
        let rows = conn.execute(
            "UPDATE users SET display_name = ? WHERE username = ?",
            params![display_name, username],
        )?;
        ensure_user_updated(rows, username)
    }

    pub fn set_emergency_rate(&self, username: &str, rate: u8) -> Result<()> {
        let conn = self.conn()?;
        let rows = conn.execute(
            "UPDATE users SET emergency_rate = ? WHERE username = ?",
            params![rate, username],
        )?;
        ensure_user_updated(rows, username)
    }

    pub fn get_profile_picture(&self, username: &str) -> Result<Option<Vec<u8>>> {
        let conn = self.conn()?;
        let picture: Option<Option<Vec<u8>>> = conn
            .query_row(
                "SELECT profile_picture FROM users WHERE username = ?",
                params![username],
                |row| row.get(0),
            )
            .optional()?;
        Ok(picture.flatten())
    }

    /// Set or clear the profile picture
    pub fn set_profile_picture(&self, username: &str, image: Option<&[u8]>) -> Result<()> {
        let conn = self.conn()?;
        let rows = conn.execute(
            "UPDATE users SET profile_picture = ? WHERE username = ?",
            params![image, username],
        )?;
        ensure_user_updated(rows, username)
    }

    /// Rename a user in a single SQL transaction
    ///
    /// `transactions.username` follows through `ON UPDATE CASCADE`; audit
    /// entries are moved by hand.
    pub fn rename_user(&self, username: &str, new_username: &str) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let rows = tx
            .execute(
                "UPDATE users SET username = ? WHERE username = ?",
                params![new_username, username],
            )
            .map_err(|e| username_conflict(e, new_username))?;
        ensure_user_updated(rows, username)?;

        tx.execute(
            "UPDATE audit_log SET username = ? WHERE username = ?",
            params![new_username, username],
        )?;

        tx.commit()?;
        Ok(())
    }

    /// Delete a user and their audit trail
    ///
    /// Transactions go with the user via `ON DELETE CASCADE`.
    pub fn delete_user(&self, username: &str) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let rows = tx.execute("DELETE FROM users WHERE username = ?", params![username])?;
        ensure_user_updated(rows, username)?;
        tx.execute("DELETE FROM audit_log WHERE username = ?", params![username])?;

        tx.commit()?;
        Ok(())
    }
}
