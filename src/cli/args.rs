//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};

/// Pick the best-available LLM provider model from live quota state.
#[derive(Parser, Debug)]
#[command(name = "modelmux")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    // === Global flags ===
    /// Output JSON instead of human-readable text
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show ranked usage candidates across providers (default command)
    Usage(UsageArgs),

    /// Select the best usable provider model and switch to it
    Select,

    /// Put the current selection in cooldown and switch to the next best
    Skip,

    /// Show or clear active cooldowns
    Cooldowns(CooldownsArgs),
}

/// Arguments for the `usage` command.
#[derive(Parser, Debug)]
pub struct UsageArgs {
    /// Only show one provider
    #[arg(long, value_name = "PROVIDER")]
    pub provider: Option<String>,
}

/// Arguments for the `cooldowns` command.
#[derive(Parser, Debug)]
pub struct CooldownsArgs {
    /// Remove all cooldowns
    #[arg(long)]
    pub clear: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::parse_from(["modelmux", "select"]);
        assert!(matches!(cli.command, Some(Commands::Select)));

        let cli = Cli::parse_from(["modelmux", "usage", "--provider", "claude"]);
        match cli.command {
            Some(Commands::Usage(args)) => assert_eq!(args.provider.as_deref(), Some("claude")),
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::parse_from(["modelmux", "cooldowns", "--clear"]);
        match cli.command {
            Some(Commands::Cooldowns(args)) => assert!(args.clear),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
