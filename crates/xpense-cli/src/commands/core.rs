//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `cmd_init` - Initialize the database
//! - `cmd_status` - Show database status
//! - `cmd_register` / `cmd_users` - Account creation and listing

use std::path::Path;

use anyhow::{Context, Result};
use xpense_core::db::{Database, DB_KEY_ENV};
use xpense_core::AccountService;

/// Environment variable consulted when --password is not given
pub const PASSWORD_ENV: &str = "XPENSE_PASSWORD";

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path must be valid UTF-8")?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    // Opening runs the migrations
    let _db = open_db(db_path, no_encrypt)?;

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Create an account: xpense register <username>");
    println!("  2. Record a transaction: xpense add -u <username> -k income -c profit -a 1.500.000");
    println!("  3. Start web UI: xpense serve");

    Ok(())
}

pub fn cmd_status(db_path: &Path, no_encrypt: bool) -> Result<()> {
    use std::fs;

    println!();
    println!("📊 Xpense Status");
    println!("   ─────────────────────────────────────────────────────────────");

    println!("   Database: {}", db_path.display());

    if db_path.exists() {
        if let Ok(metadata) = fs::metadata(db_path) {
            let size_kb = metadata.len() as f64 / 1024.0;
            if size_kb < 1024.0 {
                println!("   Size: {:.1} KB", size_kb);
            } else {
                println!("   Size: {:.1} MB", size_kb / 1024.0);
            }
        }
    } else {
        println!("   Size: (database not initialized)");
    }

    let has_key = std::env::var(DB_KEY_ENV).is_ok();
    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else if has_key {
        println!("   🔒 Encryption: ENABLED ({}=***)", DB_KEY_ENV);
    } else {
        println!("   ❌ Encryption: REQUIRED but {} not set", DB_KEY_ENV);
    }

    if db_path.exists() {
        match open_db(db_path, no_encrypt) {
            Ok(db) => {
                let users = db.list_users()?;
                println!();
                println!("   Users: {}", users.len());
                for user in users {
                    let count = db.count_transactions(&user.username, &Default::default())?;
                    println!("     - {} ({} transactions)", user.username, count);
                }
            }
            Err(e) => {
                println!();
                println!("   ❌ Error opening database: {}", e);
                if !no_encrypt && !has_key {
                    println!("      Set {} or use --no-encrypt", DB_KEY_ENV);
                } else if has_key {
                    println!("      (Check if {} is correct)", DB_KEY_ENV);
                }
            }
        }
    }

    println!();
    Ok(())
}

/// Use the given password or fall back to XPENSE_PASSWORD
pub fn resolve_password(password: Option<String>) -> Result<String> {
    match password {
        Some(p) => Ok(p),
        None => std::env::var(PASSWORD_ENV)
            .with_context(|| format!("Pass --password or set {}", PASSWORD_ENV)),
    }
}

pub fn cmd_register(db: &Database, username: &str, password: &str) -> Result<()> {
    let user = AccountService::new(db)
        .register(username, password, password)
        .context("Failed to register")?;
    db.log_audit(&user.username, "register", Some("user"), None, Some("cli"))?;

    println!("✅ Registered '{}'", user.username);
    println!("   Emergency fund rate: {}%", user.emergency_rate);
    Ok(())
}

pub fn cmd_users(db: &Database) -> Result<()> {
    let users = db.list_users()?;

    if users.is_empty() {
        println!("No users yet. Create one with:");
        println!("  xpense register <username>");
        return Ok(());
    }

    println!();
    println!("👤 Users");
    println!("   ─────────────────────────────────────────────────────────────");
    for user in users {
        println!(
            "   {:<20} │ {:<24} │ fund {:>2}% │ since {}",
            user.username,
            user.display_name,
            user.emergency_rate,
            user.created_at.format("%Y-%m-%d")
        );
    }

    Ok(())
}
