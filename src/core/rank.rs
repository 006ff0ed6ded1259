//! Priority-based candidate ranking.
//!
//! The ranker applies an ordered chain of rules as a multi-key
//! lexicographic sort: a later rule only breaks ties left by all earlier
//! rules. The sort is stable, so a full tie preserves the aggregator's
//! output order and re-ranking an identical input always yields the same
//! result.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::models::UsageCandidate;
use crate::error::{MuxError, Result};

// =============================================================================
// Priority Rules
// =============================================================================

/// A single ranking rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityRule {
    /// Untouched windows (`used_percent == 0`) rank before partial ones.
    FullAvailability,
    /// Higher remaining percentage ranks first.
    RemainingPercent,
    /// Known reset times rank before unknown; earlier resets rank first
    /// (the quota frees up soonest).
    EarliestReset,
}

impl PriorityRule {
    /// All rule kinds. A valid chain is a permutation of exactly these.
    pub const ALL: &'static [Self] = &[
        Self::FullAvailability,
        Self::RemainingPercent,
        Self::EarliestReset,
    ];

    fn compare(self, a: &UsageCandidate, b: &UsageCandidate) -> Ordering {
        match self {
            Self::FullAvailability => b
                .has_full_availability()
                .cmp(&a.has_full_availability()),
            Self::RemainingPercent => b
                .remaining_percent
                .partial_cmp(&a.remaining_percent)
                .unwrap_or(Ordering::Equal),
            Self::EarliestReset => match (a.resets_at, b.resets_at) {
                (Some(a_at), Some(b_at)) => a_at.cmp(&b_at),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        }
    }
}

// =============================================================================
// Priority Chain
// =============================================================================

/// An ordered permutation of all three rules. Six valid values exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityChain(Vec<PriorityRule>);

impl PriorityChain {
    /// Validate a rule list into a chain: exactly the three rule kinds,
    /// no duplicates, no omissions.
    pub fn new(rules: Vec<PriorityRule>) -> Result<Self> {
        if rules.len() != PriorityRule::ALL.len()
            || PriorityRule::ALL.iter().any(|r| !rules.contains(r))
        {
            return Err(MuxError::ConfigInvalid {
                key: "priority".to_string(),
                message: format!(
                    "must be a permutation of full_availability, remaining_percent, \
                     earliest_reset; got {rules:?}"
                ),
            });
        }
        Ok(Self(rules))
    }

    /// Rules in precedence order.
    #[must_use]
    pub fn rules(&self) -> &[PriorityRule] {
        &self.0
    }

    fn compare(&self, a: &UsageCandidate, b: &UsageCandidate) -> Ordering {
        for rule in &self.0 {
            match rule.compare(a, b) {
                Ordering::Equal => {}
                other => return other,
            }
        }
        Ordering::Equal
    }
}

impl Default for PriorityChain {
    fn default() -> Self {
        Self(vec![
            PriorityRule::FullAvailability,
            PriorityRule::RemainingPercent,
            PriorityRule::EarliestReset,
        ])
    }
}

// =============================================================================
// Ranking
// =============================================================================

/// Sort candidates best-first under the chain. Stable: full ties keep
/// input order.
#[must_use]
pub fn rank(candidates: &[UsageCandidate], chain: &PriorityChain) -> Vec<UsageCandidate> {
    let mut ranked = candidates.to_vec();
    ranked.sort_by(|a, b| chain.compare(a, b));
    ranked
}

/// The single best candidate, or `None` when no eligible candidates
/// remain. An empty input is an outcome, not an error.
#[must_use]
pub fn best<'a>(
    candidates: &'a [UsageCandidate],
    chain: &PriorityChain,
) -> Option<&'a UsageCandidate> {
    candidates
        .iter()
        .reduce(|best, c| match chain.compare(c, best) {
            // Strictly-better only: on ties the earlier candidate stays
            Ordering::Less => c,
            _ => best,
        })
}
