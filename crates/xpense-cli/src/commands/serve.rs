//! Server command implementation

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};

use super::open_db;

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    no_encrypt: bool,
    static_dir: Option<&Path>,
    session_hours: u64,
) -> Result<()> {
    println!("🚀 Starting Xpense web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }

    // Extra CORS origins from environment (comma-separated)
    let origins_str = std::env::var(xpense_server::ALLOWED_ORIGINS_ENV).unwrap_or_default();
    let allowed_origins = xpense_server::parse_allowed_origins(&origins_str);

    println!("   🔒 Authentication: login sessions (expire after {}h idle)", session_hours);
    if !allowed_origins.is_empty() {
        println!(
            "   🌐 CORS origins: {} ({})",
            allowed_origins.join(", "),
            xpense_server::ALLOWED_ORIGINS_ENV
        );
    }
    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path, no_encrypt)?;

    let config = xpense_server::ServerConfig {
        allowed_origins,
        session_timeout: Duration::from_secs(session_hours.max(1) * 60 * 60),
    };

    let static_dir_str = static_dir
        .map(|p| p.to_str().context("static_dir path must be valid UTF-8"))
        .transpose()?;
    xpense_server::serve_with_config(db, host, port, static_dir_str, config).await?;

    Ok(())
}
