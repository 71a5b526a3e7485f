//! Account settings command implementations

use anyhow::{bail, Context, Result};
use xpense_core::db::Database;
use xpense_core::AccountService;

use crate::cli::SettingsAction;

pub fn cmd_settings(db: &Database, username: &str, action: SettingsAction) -> Result<()> {
    let accounts = AccountService::new(db);

    match action {
        SettingsAction::Show => {
            let user = accounts.profile(username)?;
            println!();
            println!("👤 {}", user.username);
            println!("   Display name:        {}", user.display_name);
            println!("   Emergency fund rate: {}%", user.emergency_rate);
            println!(
                "   Profile picture:     {}",
                if user.has_profile_picture { "yes" } else { "no" }
            );
            println!("   Member since:        {}", user.created_at.format("%Y-%m-%d"));
        }
        SettingsAction::DisplayName { name } => {
            let user = accounts.set_display_name(username, &name)?;
            db.log_audit(username, "update_display_name", Some("user"), None, Some("cli"))?;
            println!("✅ Display name set to '{}'", user.display_name);
        }
        SettingsAction::Rename { new_username } => {
            let user = accounts.rename(username, &new_username)?;
            if user.username != username {
                db.log_audit(
                    &user.username,
                    "rename",
                    Some("user"),
                    None,
                    Some(&format!("from={} (cli)", username)),
                )?;
            }
            println!("✅ Account is now '{}'", user.username);
        }
        SettingsAction::Password { current, new } => {
            accounts.change_password(username, &current, &new)?;
            db.log_audit(username, "change_password", Some("user"), None, Some("cli"))?;
            println!("✅ Password changed");
        }
        SettingsAction::EmergencyRate { rate } => {
            let user = accounts.set_emergency_rate(username, rate)?;
            db.log_audit(
                username,
                "update_emergency_rate",
                Some("user"),
                None,
                Some(&format!("rate={} (cli)", rate)),
            )?;
            println!(
                "✅ {}% of each new income will be set aside",
                user.emergency_rate
            );
        }
        SettingsAction::Photo { file } => {
            let image = std::fs::read(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            accounts.set_profile_picture(username, &image)?;
            db.log_audit(username, "update_profile_picture", Some("user"), None, Some("cli"))?;
            println!("✅ Profile picture updated ({} bytes)", image.len());
        }
        SettingsAction::RemovePhoto => {
            accounts.remove_profile_picture(username)?;
            db.log_audit(username, "remove_profile_picture", Some("user"), None, Some("cli"))?;
            println!("✅ Profile picture removed");
        }
        SettingsAction::Delete { yes } => {
            if !yes {
                bail!(
                    "Deleting '{}' removes all of its transactions. Re-run with --yes to confirm",
                    username
                );
            }
            accounts.delete_account(username)?;
            println!("🗑️  Deleted account '{}'", username);
        }
    }

    Ok(())
}
