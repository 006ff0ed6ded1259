//! Selection orchestration: `select` and `skip`.
//!
//! Composes aggregation, mapping resolution, cooldown filtering, and
//! ranking into the two user-facing operations, and applies the winning
//! model to the host. Neither operation is re-entrant-safe within a
//! process; callers run one command at a time.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::aggregate;
use super::mapping::{self, find_ignore_mapping};
use super::models::{ModelId, UsageCandidate};
use super::rank::{self, PriorityChain};
use crate::error::{MuxError, Result};
use crate::storage::{AppPaths, Config, CooldownStore, statefile};

// =============================================================================
// Host Capability
// =============================================================================

/// The host's model-switch capability. Declared once at startup; the
/// orchestrator never probes for it per call.
pub trait ModelHost {
    /// The model the host is currently on, if known.
    fn active_model(&self) -> Option<ModelId>;

    /// Switch the host to `model`. Failures surface verbatim and are not
    /// retried.
    fn set_model(&mut self, model: &ModelId) -> Result<()>;
}

/// Default host: records the active model in a state file and, when a
/// switch command is configured, runs it with `{model}` substituted.
pub struct StateHost {
    state_file: PathBuf,
    switch_command: Option<String>,
    active: Option<ModelId>,
}

impl StateHost {
    /// Load the host state. A missing or corrupt record means no active
    /// model is known.
    #[must_use]
    pub fn new(state_file: PathBuf, switch_command: Option<String>) -> Self {
        let active = statefile::read_json(&state_file);
        Self {
            state_file,
            switch_command,
            active,
        }
    }
}

impl ModelHost for StateHost {
    fn active_model(&self) -> Option<ModelId> {
        self.active.clone()
    }

    fn set_model(&mut self, model: &ModelId) -> Result<()> {
        if let Some(template) = &self.switch_command {
            run_switch_command(template, model)?;
        }
        statefile::write_json(&self.state_file, model)?;
        self.active = Some(model.clone());
        Ok(())
    }
}

fn run_switch_command(template: &str, model: &ModelId) -> Result<()> {
    let rendered = model.to_string();
    let mut parts = template
        .split_whitespace()
        .map(|part| part.replace("{model}", &rendered));

    let program = parts.next().ok_or_else(|| MuxError::Config(
        "switch_command is empty".to_string(),
    ))?;
    let args: Vec<String> = parts.collect();

    tracing::debug!(command = %program, ?args, "Running switch command");
    let status = std::process::Command::new(&program)
        .args(&args)
        .status()
        .map_err(|e| MuxError::HostSwitchFailed {
            reason: format!("{program}: {e}"),
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(MuxError::HostSwitchFailed {
            reason: format!("{program} exited with {status}"),
        })
    }
}

// =============================================================================
// Candidate Source
// =============================================================================

/// Where a selection cycle gets its candidates. The live source fetches
/// provider CLIs; tests substitute a fixed list.
#[allow(async_fn_in_trait)]
pub trait CandidateSource {
    async fn candidates(&mut self, config: &Config) -> Vec<UsageCandidate>;
}

/// Live source backed by the fetch adapters.
#[derive(Debug, Default)]
pub struct LiveSource;

impl CandidateSource for LiveSource {
    async fn candidates(&mut self, config: &Config) -> Vec<UsageCandidate> {
        aggregate::collect_candidates(config).await.candidates
    }
}

// =============================================================================
// Outcomes
// =============================================================================

/// Outcome of one `select` operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The host is already on the best candidate's model.
    AlreadyUsing { model: ModelId },
    /// The host was switched to a new model.
    Switched { model: ModelId },
    /// No eligible candidate remained.
    NoneAvailable,
}

impl Selection {
    /// Human-readable status string.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::AlreadyUsing { model } => format!("Already using {model}"),
            Self::Switched { model } => format!("Set model to {model}"),
            Self::NoneAvailable => "No usable provider".to_string(),
        }
    }
}

/// Outcome of one `skip` operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipOutcome {
    /// Nothing had been selected and the implicit select found nothing.
    NothingToSkip,
    /// The previous choice was put in cooldown; `next` is the re-selection.
    Skipped {
        skipped: String,
        cooldown: Duration,
        next: Selection,
    },
}

impl SkipOutcome {
    /// Human-readable status string, combining the cooldown notice with
    /// the re-selection report.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::NothingToSkip => "No usable provider".to_string(),
            Self::Skipped {
                skipped,
                cooldown,
                next,
            } => format!(
                "Skipped {skipped} (cooldown {}m). {}",
                cooldown.as_secs() / 60,
                next.message()
            ),
        }
    }
}

/// Persisted record of the last selection, consulted by `skip`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LastSelection {
    key: String,
    recorded_at: DateTime<Utc>,
}

// =============================================================================
// Switcher
// =============================================================================

/// The selection orchestrator.
pub struct Switcher<H: ModelHost, S: CandidateSource> {
    config: Config,
    chain: PriorityChain,
    cooldowns: CooldownStore,
    last_selection_file: PathBuf,
    host: H,
    source: S,
}

impl<H: ModelHost, S: CandidateSource> Switcher<H, S> {
    /// Build a switcher from loaded configuration and paths.
    pub fn new(config: Config, paths: &AppPaths, host: H, source: S) -> Result<Self> {
        let chain = config.priority_chain()?;
        let cooldowns = CooldownStore::load(paths.cooldown_file());
        Ok(Self {
            config,
            chain,
            cooldowns,
            last_selection_file: paths.last_selection_file(),
            host,
            source,
        })
    }

    /// Select the best currently-usable candidate and apply its model to
    /// the host.
    pub async fn select(&mut self) -> Result<Selection> {
        let candidates = self.source.candidates(&self.config).await;
        self.select_from(candidates, Utc::now())
    }

    /// Put the last-selected candidate in cooldown and re-select. When no
    /// selection is recorded, an implicit `select` establishes one first.
    pub async fn skip(&mut self) -> Result<SkipOutcome> {
        let now = Utc::now();
        let key = match self.last_selection_key() {
            Some(key) => key,
            None => {
                if matches!(self.select().await?, Selection::NoneAvailable) {
                    return Ok(SkipOutcome::NothingToSkip);
                }
                self.last_selection_key().ok_or_else(|| {
                    MuxError::Config("selection was not recorded".to_string())
                })?
            }
        };

        let cooldown = self.config.cooldown();
        self.cooldowns.put_cooldown(&key, cooldown, now);
        self.cooldowns.flush(now)?;
        tracing::info!(key = %key, minutes = cooldown.as_secs() / 60, "Placed cooldown");

        let next = self.select().await?;
        Ok(SkipOutcome::Skipped {
            skipped: key,
            cooldown,
            next,
        })
    }

    /// One selection pass over an already-aggregated candidate list.
    pub fn select_from(
        &mut self,
        candidates: Vec<UsageCandidate>,
        now: DateTime<Utc>,
    ) -> Result<Selection> {
        let eligible: Vec<UsageCandidate> = candidates
            .into_iter()
            .filter(|c| find_ignore_mapping(c, &self.config.mappings).is_none())
            .filter(|c| !self.cooldowns.is_cooling_down(&self.cooldown_key(c), now))
            .collect();

        let Some(best) = rank::best(&eligible, &self.chain) else {
            return Ok(Selection::NoneAvailable);
        };

        let model = self.model_identity(best);
        let key = self.cooldown_key(best);
        tracing::debug!(
            candidate = %best.raw_key(),
            model = %model,
            remaining = best.remaining_percent,
            "Ranked best candidate"
        );
        self.record_last_selection(&key, now)?;

        if self.host.active_model().as_ref() == Some(&model) {
            return Ok(Selection::AlreadyUsing { model });
        }
        self.host.set_model(&model)?;
        Ok(Selection::Switched { model })
    }

    fn model_identity(&self, candidate: &UsageCandidate) -> ModelId {
        mapping::model_identity(candidate, &self.config.mappings)
    }

    fn cooldown_key(&self, candidate: &UsageCandidate) -> String {
        mapping::cooldown_key(candidate, &self.config.mappings)
    }

    fn last_selection_key(&self) -> Option<String> {
        statefile::read_json::<LastSelection>(&self.last_selection_file)
            .map(|record| record.key)
    }

    fn record_last_selection(&self, key: &str, now: DateTime<Utc>) -> Result<()> {
        statefile::write_json(
            &self.last_selection_file,
            &LastSelection {
                key: key.to_string(),
                recorded_at: now,
            },
        )
    }

    /// The host, for inspection in tests.
    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }
}
