//! Provider descriptors.
//!
//! Defines the supported providers and their metadata: CLI binary names,
//! display names, and per-provider fetch timeouts.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{MuxError, Result};

/// Supported LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Claude,
    Codex,
    Gemini,
    Cursor,
}

impl Provider {
    /// All providers in registration order. This order is also the
    /// aggregation order: candidates are emitted per provider in this
    /// sequence, and the ranker's stable sort preserves it on full ties.
    pub const ALL: &'static [Self] = &[Self::Claude, Self::Codex, Self::Gemini, Self::Cursor];

    /// CLI binary name for this provider.
    #[must_use]
    pub const fn cli_name(self) -> &'static str {
        match self {
            Self::Claude => "claude",
            Self::Codex => "codex",
            Self::Gemini => "gemini",
            Self::Cursor => "cursor",
        }
    }

    /// Display name for human output.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Claude => "Claude",
            Self::Codex => "Codex",
            Self::Gemini => "Gemini",
            Self::Cursor => "Cursor",
        }
    }

    /// Parse from CLI argument or config value.
    pub fn from_cli_name(name: &str) -> Result<Self> {
        let lower = name.to_lowercase();
        Self::ALL
            .iter()
            .find(|p| p.cli_name() == lower)
            .copied()
            .ok_or_else(|| MuxError::InvalidProvider(name.to_string()))
    }

    /// Default timeout for this provider's fetch.
    #[must_use]
    pub const fn default_timeout(self) -> Duration {
        match self {
            // Gemini's CLI does a network round-trip before printing quota
            Self::Gemini => Duration::from_secs(15),
            Self::Cursor => Duration::from_secs(8),
            _ => Duration::from_secs(10),
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.cli_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_cli_name() {
        assert_eq!(Provider::from_cli_name("claude").unwrap(), Provider::Claude);
        assert_eq!(Provider::from_cli_name("CODEX").unwrap(), Provider::Codex);
        assert!(Provider::from_cli_name("invalid").is_err());
    }

    #[test]
    fn provider_default_timeout_values() {
        assert_eq!(Provider::Claude.default_timeout().as_secs(), 10);
        assert_eq!(Provider::Gemini.default_timeout().as_secs(), 15);
        assert_eq!(Provider::Cursor.default_timeout().as_secs(), 8);
    }

    #[test]
    fn all_providers_have_unique_cli_names() {
        use std::collections::HashSet;
        let names: HashSet<_> = Provider::ALL.iter().map(|p| p.cli_name()).collect();
        assert_eq!(names.len(), Provider::ALL.len());
    }
}
