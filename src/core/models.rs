//! Core data models for usage windows, reports, and selection candidates.
//!
//! A provider fetch produces one [`UsageReport`] holding zero or more
//! [`UsageWindow`]s (one per quota bucket). The aggregator flattens reports
//! into [`UsageCandidate`]s, one per (provider, account, window), which are
//! the unit of ranking and selection. Candidates are built fresh on every
//! cycle and never mutated afterwards, only filtered and reordered.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::provider::Provider;

/// Clamp a percentage into [0, 100].
#[must_use]
pub fn clamp_percent(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// Normalize a window label for deduplication: lowercase, collapsed
/// whitespace.
#[must_use]
pub fn normalize_label(label: &str) -> String {
    label.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

// =============================================================================
// Usage Window
// =============================================================================

/// A single quota bucket reported by a provider (e.g., session limit,
/// weekly limit, bonus credits). Immutable once parsed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UsageWindow {
    /// Label as reported by the provider (e.g., "Weekly limit").
    pub label: String,

    /// Percentage of the window consumed (0-100).
    pub used_percent: f64,

    /// When the window resets, if the provider reported an absolute time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resets_at: Option<DateTime<Utc>>,

    /// Human-readable reset description (e.g., "3d left") when only a
    /// relative countdown is known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_description: Option<String>,
}

impl UsageWindow {
    /// Create a new window with the given usage percentage, clamped.
    #[must_use]
    pub fn new(label: impl Into<String>, used_percent: f64) -> Self {
        Self {
            label: label.into(),
            used_percent: clamp_percent(used_percent),
            resets_at: None,
            reset_description: None,
        }
    }

    /// Percentage remaining in this window, clamped to [0, 100].
    #[must_use]
    pub fn remaining_percent(&self) -> f64 {
        clamp_percent(100.0 - self.used_percent)
    }
}

// =============================================================================
// Usage Report
// =============================================================================

/// Everything one fetch adapter learned about one provider.
///
/// A report with zero windows is valid: the provider is reachable but has
/// no active quotas.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageReport {
    pub provider: Provider,
    pub display_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    pub windows: Vec<UsageWindow>,
}

impl UsageReport {
    /// Create an empty report for a provider.
    #[must_use]
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            display_name: provider.display_name().to_string(),
            account: None,
            windows: Vec::new(),
        }
    }

    /// Add a window, deduplicating by normalized label. A looser pattern
    /// re-matching an already-captured quota must not create a second
    /// window with the same meaning; the first parse wins.
    pub fn push_window(&mut self, window: UsageWindow) {
        let key = normalize_label(&window.label);
        if self.windows.iter().any(|w| normalize_label(&w.label) == key) {
            return;
        }
        self.windows.push(window);
    }

    /// Mutable access to the most recently added window. Adapters use this
    /// to attach reset info that appears on a line after the quota line.
    pub fn last_window_mut(&mut self) -> Option<&mut UsageWindow> {
        self.windows.last_mut()
    }
}

// =============================================================================
// Usage Candidate
// =============================================================================

/// One (provider, account, window) triple eligible for selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UsageCandidate {
    pub provider: Provider,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    pub display_name: String,
    pub window_label: String,
    pub used_percent: f64,
    pub remaining_percent: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resets_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_description: Option<String>,
}

impl UsageCandidate {
    /// Build a candidate from one window of a report.
    #[must_use]
    pub fn from_window(report: &UsageReport, window: &UsageWindow) -> Self {
        Self {
            provider: report.provider,
            account: report.account.clone(),
            display_name: report.display_name.clone(),
            window_label: window.label.clone(),
            used_percent: window.used_percent,
            remaining_percent: window.remaining_percent(),
            resets_at: window.resets_at,
            reset_description: window.reset_description.clone(),
        }
    }

    /// True when nothing of this window has been consumed.
    #[must_use]
    pub fn has_full_availability(&self) -> bool {
        self.used_percent == 0.0
    }

    /// Raw identity key: provider + account + window. Used for cooldowns
    /// when no model mapping applies.
    #[must_use]
    pub fn raw_key(&self) -> String {
        format!(
            "{}:{}:{}",
            self.provider.cli_name(),
            self.account.as_deref().unwrap_or("-"),
            self.window_label
        )
    }
}

// =============================================================================
// Model Identity
// =============================================================================

/// A logical model identity: the target of a model mapping, or the raw
/// provider/window pair when no mapping applies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelId {
    pub provider: String,
    pub id: String,
}

impl ModelId {
    /// Identity for an unmapped candidate: raw provider/window.
    #[must_use]
    pub fn from_candidate(candidate: &UsageCandidate) -> Self {
        Self {
            provider: candidate.provider.cli_name().to_string(),
            id: candidate.window_label.clone(),
        }
    }

    /// Cooldown key for this model identity.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}/{}", self.provider, self.id)
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.provider, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_percent_is_complement_of_used() {
        for used in [0.0, 1.0, 33.5, 50.0, 99.9, 100.0] {
            let window = UsageWindow::new("Session", used);
            assert!((window.remaining_percent() - (100.0 - used)).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn window_clamps_out_of_range_percent() {
        assert!((UsageWindow::new("a", 150.0).used_percent - 100.0).abs() < f64::EPSILON);
        assert!((UsageWindow::new("a", -5.0).used_percent - 0.0).abs() < f64::EPSILON);
        assert!((UsageWindow::new("a", 150.0).remaining_percent() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn report_dedups_windows_by_normalized_label() {
        let mut report = UsageReport::new(Provider::Codex);
        report.push_window(UsageWindow::new("Bonus credits", 20.0));
        report.push_window(UsageWindow::new("bonus  CREDITS", 55.0));
        assert_eq!(report.windows.len(), 1);
        assert!((report.windows[0].used_percent - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn candidate_mirrors_window_consistently() {
        let mut report = UsageReport::new(Provider::Claude);
        report.account = Some("me@example.com".to_string());
        report.push_window(UsageWindow::new("Weekly", 40.0));

        let candidate = UsageCandidate::from_window(&report, &report.windows[0]);
        assert_eq!(candidate.provider, Provider::Claude);
        assert!((candidate.remaining_percent - 60.0).abs() < f64::EPSILON);
        assert!(
            (candidate.used_percent + candidate.remaining_percent - 100.0).abs() < f64::EPSILON
        );
        assert_eq!(candidate.raw_key(), "claude:me@example.com:Weekly");
    }

    #[test]
    fn raw_key_uses_dash_for_missing_account() {
        let report = UsageReport::new(Provider::Gemini);
        let window = UsageWindow::new("Daily", 10.0);
        let candidate = UsageCandidate::from_window(&report, &window);
        assert_eq!(candidate.raw_key(), "gemini:-:Daily");
    }

    #[test]
    fn model_id_display_and_key() {
        let model = ModelId {
            provider: "anthropic".to_string(),
            id: "claude-sonnet".to_string(),
        };
        assert_eq!(model.to_string(), "anthropic/claude-sonnet");
        assert_eq!(model.key(), "anthropic/claude-sonnet");
    }
}
