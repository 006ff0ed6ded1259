//! Mapping resolver: decides which usage candidates are ignored and which
//! logical model a candidate corresponds to.
//!
//! Mappings are an ordered list; both lookups scan it linearly and the
//! first matching entry wins. Expected list sizes are tens of entries, so
//! no index is built.

use serde::{Deserialize, Serialize};

use super::models::{ModelId, UsageCandidate};

/// `window_pattern` values treated as matching every label, equivalent to
/// omitting the pattern entirely.
pub const CATCH_ALL_PATTERNS: &[&str] = &["*", ".*", "^.*$", "^.*", ".*$", ".+", "^.+$"];

// =============================================================================
// Mapping Entries
// =============================================================================

/// Matcher over usage candidates.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct UsageMatcher {
    /// Provider CLI name (case-insensitive).
    pub provider: String,

    /// Account to match; absent means any account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    /// Exact window label to match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<String>,

    /// Regex over the window label. One of the fixed catch-all patterns is
    /// equivalent to omitting it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_pattern: Option<String>,
}

impl UsageMatcher {
    /// A matcher with neither a window nor a (non-catch-all) pattern
    /// matches every window of its provider/account.
    #[must_use]
    pub fn is_catch_all(&self) -> bool {
        match (&self.window, &self.window_pattern) {
            (None, None) => true,
            (None, Some(pattern)) => CATCH_ALL_PATTERNS.contains(&pattern.as_str()),
            _ => false,
        }
    }

    /// Whether this matcher matches the given candidate.
    #[must_use]
    pub fn matches(&self, candidate: &UsageCandidate) -> bool {
        if !self
            .provider
            .eq_ignore_ascii_case(candidate.provider.cli_name())
        {
            return false;
        }

        if let Some(account) = &self.account {
            if candidate.account.as_deref() != Some(account.as_str()) {
                return false;
            }
        }

        if self.is_catch_all() {
            return true;
        }

        if let Some(window) = &self.window {
            return *window == candidate.window_label;
        }

        if let Some(pattern) = &self.window_pattern {
            return match regex::Regex::new(pattern) {
                Ok(re) => re.is_match(&candidate.window_label),
                Err(e) => {
                    tracing::warn!(pattern, error = %e, "Invalid window pattern, matches nothing");
                    false
                }
            };
        }

        false
    }
}

/// One mapping rule: a usage matcher plus a model target and/or an ignore
/// flag. Entry order in the list is significant.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MappingEntry {
    pub usage: UsageMatcher,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore: Option<bool>,
}

impl MappingEntry {
    /// An ignore entry whose matcher catches every window of its
    /// provider/account.
    #[must_use]
    pub fn is_catch_all_ignore(&self) -> bool {
        self.ignore == Some(true) && self.usage.is_catch_all()
    }
}

// =============================================================================
// Lookups
// =============================================================================

/// First entry with `ignore = true` whose matcher matches the candidate.
/// A matched candidate is excluded from ranking entirely.
#[must_use]
pub fn find_ignore_mapping<'a>(
    candidate: &UsageCandidate,
    mappings: &'a [MappingEntry],
) -> Option<&'a MappingEntry> {
    mappings
        .iter()
        .find(|entry| entry.ignore == Some(true) && entry.usage.matches(candidate))
}

/// First entry carrying a model target whose matcher matches the
/// candidate. Ignore-only entries are passed over.
#[must_use]
pub fn find_model_mapping<'a>(
    candidate: &UsageCandidate,
    mappings: &'a [MappingEntry],
) -> Option<&'a MappingEntry> {
    mappings
        .iter()
        .find(|entry| entry.model.is_some() && entry.usage.matches(candidate))
}

/// Logical model identity for a candidate: the mapped model when one
/// exists, the raw provider/window pair otherwise.
#[must_use]
pub fn model_identity(candidate: &UsageCandidate, mappings: &[MappingEntry]) -> ModelId {
    find_model_mapping(candidate, mappings)
        .and_then(|entry| entry.model.clone())
        .unwrap_or_else(|| ModelId::from_candidate(candidate))
}

/// Cooldown key for a candidate. Mapped-model identity takes precedence
/// over the raw provider/account/window key, so a cooldown applies per
/// logical model rather than per raw usage bucket.
#[must_use]
pub fn cooldown_key(candidate: &UsageCandidate, mappings: &[MappingEntry]) -> String {
    find_model_mapping(candidate, mappings)
        .and_then(|entry| entry.model.as_ref())
        .map_or_else(|| candidate.raw_key(), ModelId::key)
}
