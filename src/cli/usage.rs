//! The `usage` command: show ranked candidates across providers.

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;

use crate::cli::args::UsageArgs;
use crate::core::aggregate;
use crate::core::mapping::{self, find_ignore_mapping};
use crate::core::models::{ModelId, UsageCandidate};
use crate::core::provider::Provider;
use crate::core::rank;
use crate::error::Result;
use crate::storage::{AppPaths, Config, CooldownStore};
use crate::util::time::format_countdown;

/// Why a candidate is (or is not) in the running.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", tag = "status")]
enum CandidateStatus {
    Eligible { rank: usize },
    Ignored,
    CoolingDown { until: DateTime<Utc> },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Row {
    #[serde(flatten)]
    candidate: UsageCandidate,
    model: ModelId,
    #[serde(flatten)]
    status: CandidateStatus,
}

/// Execute the usage command.
pub async fn execute(args: &UsageArgs, json: bool) -> Result<()> {
    let config = Config::load()?;
    config.validate()?;
    let chain = config.priority_chain()?;
    let provider_filter = args
        .provider
        .as_deref()
        .map(Provider::from_cli_name)
        .transpose()?;

    let paths = AppPaths::new();
    let cooldowns = CooldownStore::load(paths.cooldown_file());
    let now = Utc::now();

    let outcome = aggregate::collect_candidates(&config).await;
    let candidates: Vec<UsageCandidate> = outcome
        .candidates
        .into_iter()
        .filter(|c| provider_filter.is_none_or(|p| c.provider == p))
        .collect();

    // Split into eligible / ignored / cooling-down, then rank the eligible
    let mut eligible = Vec::new();
    let mut excluded = Vec::new();
    for candidate in candidates {
        if find_ignore_mapping(&candidate, &config.mappings).is_some() {
            excluded.push((candidate, CandidateStatus::Ignored));
            continue;
        }
        let key = mapping::cooldown_key(&candidate, &config.mappings);
        if let Some((_, until)) = cooldowns
            .active(now)
            .into_iter()
            .find(|(active_key, _)| *active_key == key)
        {
            excluded.push((candidate, CandidateStatus::CoolingDown { until }));
            continue;
        }
        eligible.push(candidate);
    }

    let ranked = rank::rank(&eligible, &chain);
    let rows: Vec<Row> = ranked
        .into_iter()
        .enumerate()
        .map(|(i, candidate)| {
            let model = mapping::model_identity(&candidate, &config.mappings);
            Row {
                candidate,
                model,
                status: CandidateStatus::Eligible { rank: i + 1 },
            }
        })
        .chain(excluded.into_iter().map(|(candidate, status)| {
            let model = mapping::model_identity(&candidate, &config.mappings);
            Row {
                candidate,
                model,
                status,
            }
        }))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No usage windows reported.");
    }
    for row in &rows {
        println!("{}", render_row(row, now));
    }
    for failure in &outcome.failures {
        println!(
            "{}",
            format!(
                "    {}  unavailable ({})",
                failure.provider.display_name(),
                failure.reason
            )
            .dimmed()
        );
    }
    Ok(())
}

fn render_row(row: &Row, now: DateTime<Utc>) -> String {
    let c = &row.candidate;
    let remaining = format!("{:>5.1}% left", c.remaining_percent);
    let reset = c.resets_at.map_or_else(
        || c.reset_description.clone().unwrap_or_default(),
        |at| format!("resets {}", format_countdown(at, now)),
    );

    match &row.status {
        CandidateStatus::Eligible { rank } => format!(
            "{:>2}. {:<8} {:<22} {}  {:<18} -> {}",
            rank,
            c.display_name,
            c.window_label,
            remaining.green(),
            reset,
            row.model.to_string().cyan()
        ),
        CandidateStatus::Ignored => format!(
            "    {:<8} {:<22} {}  {}",
            c.display_name,
            c.window_label,
            remaining.dimmed(),
            "ignored".dimmed()
        ),
        CandidateStatus::CoolingDown { until } => format!(
            "    {:<8} {:<22} {}  {}",
            c.display_name,
            c.window_label,
            remaining.yellow(),
            format!("cooling down ({})", format_countdown(*until, now)).yellow()
        ),
    }
}
