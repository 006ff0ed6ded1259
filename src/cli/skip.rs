//! The `skip` command: cool down the current selection, pick the next.

use colored::Colorize;
use serde_json::json;

use crate::core::switcher::{LiveSource, Selection, SkipOutcome, StateHost, Switcher};
use crate::error::Result;
use crate::storage::{AppPaths, Config};

/// Execute the skip command.
pub async fn execute(json: bool) -> Result<()> {
    let config = Config::load()?;
    config.validate()?;
    let paths = AppPaths::new();
    let host = StateHost::new(paths.active_model_file(), config.switch_command.clone());
    let mut switcher = Switcher::new(config, &paths, host, LiveSource)?;

    let outcome = switcher.skip().await?;

    if json {
        let payload = match &outcome {
            SkipOutcome::NothingToSkip => json!({"outcome": "nothingToSkip"}),
            SkipOutcome::Skipped {
                skipped,
                cooldown,
                next,
            } => {
                let next = match next {
                    Selection::AlreadyUsing { model } => {
                        json!({"outcome": "alreadyUsing", "model": model})
                    }
                    Selection::Switched { model } => {
                        json!({"outcome": "switched", "model": model})
                    }
                    Selection::NoneAvailable => json!({"outcome": "noneAvailable"}),
                };
                json!({
                    "outcome": "skipped",
                    "skipped": skipped,
                    "cooldownMinutes": cooldown.as_secs() / 60,
                    "next": next,
                })
            }
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    let message = outcome.message();
    match outcome {
        SkipOutcome::Skipped { .. } => println!("{}", message.green()),
        SkipOutcome::NothingToSkip => println!("{}", message.yellow()),
    }
    Ok(())
}
