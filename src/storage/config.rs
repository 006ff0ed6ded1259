//! Configuration file loading.
//!
//! Loads configuration from:
//! - Linux/macOS: `~/.config/modelmux/config.toml`
//! - Windows: `%APPDATA%/modelmux/config.toml`
//!
//! `MODELMUX_CONFIG` overrides the path. A missing file yields the
//! built-in defaults; a file that exists but does not parse is an error.
//!
//! ```toml
//! disabled_providers = ["gemini"]
//! priority = ["remaining_percent", "full_availability", "earliest_reset"]
//! cooldown_minutes = 30
//! switch_command = "agentctl set-model {model}"
//!
//! [[mappings]]
//! ignore = true
//! [mappings.usage]
//! provider = "codex"
//! window_pattern = "^Bonus"
//!
//! [[mappings]]
//! [mappings.usage]
//! provider = "claude"
//! [mappings.model]
//! provider = "anthropic"
//! id = "claude-sonnet"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::paths::AppPaths;
use crate::core::mapping::MappingEntry;
use crate::core::provider::Provider;
use crate::core::rank::{PriorityChain, PriorityRule};
use crate::error::{MuxError, Result};

/// Environment variable to override the config file path.
pub const ENV_CONFIG: &str = "MODELMUX_CONFIG";

/// Raw configuration as found on disk. All fields optional; defaults
/// apply where absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Providers excluded from fetching entirely.
    pub disabled_providers: Vec<String>,

    /// Priority chain; must be a permutation of all three rules.
    pub priority: Option<Vec<PriorityRule>>,

    /// Cooldown duration placed on a skipped candidate, in minutes.
    pub cooldown_minutes: Option<u64>,

    /// Optional external command run on model switch. `{model}` expands
    /// to `provider/id`. Declared once here; absence means the host only
    /// records the active model.
    pub switch_command: Option<String>,

    /// Ordered mapping list; first matching entry wins.
    pub mappings: Vec<MappingEntry>,
}

impl Config {
    /// Load from the default location (or `MODELMUX_CONFIG`).
    pub fn load() -> Result<Self> {
        let path = std::env::var(ENV_CONFIG)
            .map_or_else(|_| AppPaths::new().config_file(), PathBuf::from);
        Self::load_from(&path)
    }

    /// Load from an explicit path. Missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| MuxError::ConfigParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// The validated priority chain.
    pub fn priority_chain(&self) -> Result<PriorityChain> {
        self.priority
            .clone()
            .map_or_else(|| Ok(PriorityChain::default()), PriorityChain::new)
    }

    /// The cooldown duration for skipped candidates.
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        self.cooldown_minutes.map_or(
            super::cooldown::DEFAULT_COOLDOWN,
            |minutes| Duration::from_secs(minutes * 60),
        )
    }

    /// Whether a provider is disabled by configuration.
    #[must_use]
    pub fn is_disabled(&self, provider: Provider) -> bool {
        self.disabled_providers
            .iter()
            .any(|name| name.eq_ignore_ascii_case(provider.cli_name()))
    }

    /// Warn about disabled-provider names that match nothing.
    pub fn validate(&self) -> Result<()> {
        for name in &self.disabled_providers {
            if Provider::from_cli_name(name).is_err() {
                tracing::warn!(provider = %name, "Unknown provider in disabled_providers");
            }
        }
        if let Some(rules) = &self.priority {
            PriorityChain::new(rules.clone())?;
        }
        Ok(())
    }
}
