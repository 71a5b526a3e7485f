//! User accounts: registration, login and profile settings

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::ledger::{validate_emergency_rate, validate_image};
use crate::models::User;
use crate::repository::UserRepository;

/// Hash a password into an Argon2id PHC string
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::PasswordHash(e.to_string()))
}

/// Check a password against a stored PHC string
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| Error::PasswordHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

fn require(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidData(format!("{} is required", what)));
    }
    Ok(())
}

/// Account operations over any user store
pub struct AccountService<'a, R: UserRepository + ?Sized> {
    repo: &'a R,
}

impl<'a, R: UserRepository + ?Sized> AccountService<'a, R> {
    pub fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    /// Register a new user; the display name starts out as the username
    pub fn register(&self, username: &str, password: &str, confirm_password: &str) -> Result<User> {
        let username = username.trim();
        require(username, "Username")?;
        require(password, "Password")?;
        require(confirm_password, "Password confirmation")?;

        if password != confirm_password {
            return Err(Error::InvalidData(
                "Password and confirmation do not match".to_string(),
            ));
        }

        if self.repo.find_user(username)?.is_some() {
            return Err(Error::Conflict(format!(
                "Username '{}' is already taken",
                username
            )));
        }

        let hash = hash_password(password)?;
        let user = self.repo.insert_user(username, &hash, username)?;
        info!(username, "Registered user");
        Ok(user)
    }

    /// Verify credentials; unknown users and wrong passwords fail the same way
    pub fn authenticate(&self, username: &str, password: &str) -> Result<User> {
        let username = username.trim();
        let Some(stored) = self.repo.password_hash(username)? else {
            warn!(username, "Login attempt for unknown user");
            return Err(Error::InvalidCredentials);
        };

        if !verify_password(password, &stored)? {
            warn!(username, "Login attempt with wrong password");
            return Err(Error::InvalidCredentials);
        }

        self.profile(username)
    }

    pub fn profile(&self, username: &str) -> Result<User> {
        self.repo
            .find_user(username)?
            .ok_or_else(|| Error::NotFound(format!("User '{}'", username)))
    }

    /// Change the password after checking the current one
    pub fn change_password(&self, username: &str, current: &str, new_password: &str) -> Result<()> {
        require(current, "Current password")?;
        require(new_password, "New password")?;

        let stored = self
            .repo
            .password_hash(username)?
            .ok_or_else(|| Error::NotFound(format!("User '{}'", username)))?;

        if !verify_password(current, &stored)? {
            return Err(Error::InvalidCredentials);
        }

        self.repo
            .update_password_hash(username, &hash_password(new_password)?)?;
        info!(username, "Password changed");
        Ok(())
    }

    /// Rename a user; all their transactions move with them
    pub fn rename(&self, username: &str, new_username: &str) -> Result<User> {
        let new_username = new_username.trim();
        require(new_username, "New username")?;

        if new_username == username {
            return self.profile(username);
        }

        if self.repo.find_user(new_username)?.is_some() {
            return Err(Error::Conflict(format!(
                "Username '{}' is already taken",
                new_username
            )));
        }

        self.repo.rename_user(username, new_username)?;
        info!(from = username, to = new_username, "Renamed user");
        self.profile(new_username)
    }

    pub fn set_display_name(&self, username: &str, display_name: &str) -> Result<User> {
        let display_name = display_name.trim();
        require(display_name, "Display name")?;
        self.repo.update_display_name(username, display_name)?;
        self.profile(username)
    }

    /// Set the share of future incomes reserved as emergency fund
    ///
    /// Existing transactions keep the fund computed when they were recorded.
    pub fn set_emergency_rate(&self, username: &str, rate: u8) -> Result<User> {
        validate_emergency_rate(rate)?;
        self.repo.update_emergency_rate(username, rate)?;
        self.profile(username)
    }

    pub fn profile_picture(&self, username: &str) -> Result<Option<Vec<u8>>> {
        self.repo.profile_picture(username)
    }

    pub fn set_profile_picture(&self, username: &str, image: &[u8]) -> Result<User> {
        validate_image(image)?;
        self.repo.update_profile_picture(username, Some(image))?;
        self.profile(username)
    }

    pub fn remove_profile_picture(&self, username: &str) -> Result<User> {
        self.repo.update_profile_picture(username, None)?;
        self.profile(username)
    }

    /// Delete the user and all of their transactions
    pub fn delete_account(&self, username: &str) -> Result<()> {
        self.profile(username)?;
        self.repo.delete_user(username)?;
        info!(username, "Deleted account");
        Ok(())
    }
}
