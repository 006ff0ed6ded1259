//! Tracing setup.
//!
//! Logs go to stderr so they never mix with command output. Level and
//! format come from CLI flags or the `MODELMUX_LOG` / `MODELMUX_LOG_FORMAT`
//! environment variables.

use tracing_subscriber::EnvFilter;

const LOG_LEVEL_ENV: &str = "MODELMUX_LOG";
const LOG_FORMAT_ENV: &str = "MODELMUX_LOG_FORMAT";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable logs.
    #[default]
    Human,
    /// JSON logs (one event per line).
    Json,
}

impl LogFormat {
    /// Parse from string (case-insensitive).
    #[must_use]
    pub fn from_arg(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "human" => Some(Self::Human),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse log format from the environment.
#[must_use]
pub fn parse_log_format_from_env() -> Option<LogFormat> {
    std::env::var(LOG_FORMAT_ENV)
        .ok()
        .and_then(|value| LogFormat::from_arg(value.trim()))
}

/// Initialize the global subscriber.
///
/// Precedence for the filter: `--log-level`, then `MODELMUX_LOG`, then
/// `--verbose` (debug), then `error`.
pub fn init(level: Option<&str>, format: LogFormat, verbose: bool) {
    let default_filter = if verbose { "debug" } else { "error" };
    let filter = level.map_or_else(
        || EnvFilter::try_from_env(LOG_LEVEL_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter)),
        EnvFilter::new,
    );

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Human => builder.try_init(),
    };
    // A second init (e.g. in tests) is harmless
    if let Err(e) = result {
        tracing::debug!("Logging already initialized: {e}");
    }
}
