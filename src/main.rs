//! modelmux - usage-aware LLM provider selection
//!
//! CLI entry point.

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use clap::Parser;
use std::process::ExitCode;

use modelmux::cli::{Cli, Commands};
use modelmux::core::logging;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_format = if cli.json {
        logging::LogFormat::Json
    } else {
        logging::parse_log_format_from_env().unwrap_or_default()
    };
    logging::init(cli.log_level.as_deref(), log_format, cli.verbose);

    let env_no_color = std::env::var_os("NO_COLOR").is_some();
    if cli.no_color || cli.json || env_no_color || !atty::is(atty::Stream::Stdout) {
        colored::control::set_override(false);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("error: {e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

async fn run(cli: Cli) -> modelmux::Result<()> {
    let json = cli.json;
    match cli.command {
        None => {
            print_quickstart();
            Ok(())
        }
        Some(Commands::Usage(args)) => modelmux::cli::usage::execute(&args, json).await,
        Some(Commands::Select) => modelmux::cli::select::execute(json).await,
        Some(Commands::Skip) => modelmux::cli::skip::execute(json).await,
        Some(Commands::Cooldowns(args)) => modelmux::cli::cooldowns::execute(&args, json),
    }
}

/// Print quickstart help when no command is given.
fn print_quickstart() {
    println!(
        r"modelmux - usage-aware LLM provider selection

Pick the provider model with the most headroom, based on live quota
state from the provider CLIs.

USAGE:
    modelmux [OPTIONS] <COMMAND>

COMMANDS:
    usage       Show ranked usage candidates across providers
    select      Select the best usable provider model and switch to it
    skip        Put the current selection in cooldown, pick the next best
    cooldowns   Show or clear active cooldowns

QUICK START:
    modelmux usage                # See every candidate, ranked
    modelmux select               # Switch to the best one
    modelmux skip                 # Not happy? Cool it down, take the next
    modelmux cooldowns --clear    # Forgive everything

ROBOT MODE (for scripts):
    modelmux usage --json
    modelmux select --json

For more help: modelmux --help
"
    );
}
