//! The `cooldowns` command: list or clear active cooldowns.

use chrono::Utc;
use colored::Colorize;
use serde_json::json;

use crate::cli::args::CooldownsArgs;
use crate::error::Result;
use crate::storage::{AppPaths, CooldownStore};
use crate::util::time::format_countdown;

/// Execute the cooldowns command.
pub fn execute(args: &CooldownsArgs, json: bool) -> Result<()> {
    let paths = AppPaths::new();
    let mut store = CooldownStore::load(paths.cooldown_file());
    let now = Utc::now();

    if args.clear {
        let count = store.active(now).len();
        store.clear();
        store.flush(now)?;
        if json {
            println!("{}", serde_json::to_string_pretty(&json!({"cleared": count}))?);
        } else {
            println!("Cleared {count} cooldown{}", if count == 1 { "" } else { "s" });
        }
        return Ok(());
    }

    let active = store.active(now);
    if json {
        let entries: Vec<_> = active
            .iter()
            .map(|(key, until)| json!({"key": key, "expiresAt": until.to_rfc3339()}))
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if active.is_empty() {
        println!("No active cooldowns.");
        return Ok(());
    }
    for (key, until) in active {
        println!("{:<40} expires {}", key, format_countdown(until, now).yellow());
    }
    Ok(())
}
