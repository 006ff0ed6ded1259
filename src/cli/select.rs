//! The `select` command: switch to the best usable provider model.

use colored::Colorize;
use serde_json::json;

use crate::core::switcher::{LiveSource, Selection, StateHost, Switcher};
use crate::error::Result;
use crate::storage::{AppPaths, Config};

/// Execute the select command.
pub async fn execute(json: bool) -> Result<()> {
    let config = Config::load()?;
    config.validate()?;
    let paths = AppPaths::new();
    let host = StateHost::new(paths.active_model_file(), config.switch_command.clone());
    let mut switcher = Switcher::new(config, &paths, host, LiveSource)?;

    let selection = switcher.select().await?;

    if json {
        let payload = match &selection {
            Selection::AlreadyUsing { model } => {
                json!({"outcome": "alreadyUsing", "model": model})
            }
            Selection::Switched { model } => json!({"outcome": "switched", "model": model}),
            Selection::NoneAvailable => json!({"outcome": "noneAvailable"}),
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    let message = selection.message();
    match selection {
        Selection::Switched { .. } => println!("{}", message.green()),
        Selection::AlreadyUsing { .. } => println!("{message}"),
        Selection::NoneAvailable => println!("{}", message.yellow()),
    }
    Ok(())
}
