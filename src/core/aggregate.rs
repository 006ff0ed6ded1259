//! Usage aggregation across providers.
//!
//! Runs every enabled fetch adapter concurrently, each bounded by its own
//! timeout, and flattens the successful reports into a flat candidate
//! list. A failing or slow adapter contributes zero candidates and never
//! cancels its siblings. Output ordering is provider registration order,
//! then window order as produced by the adapter; ranking is a separate
//! stage.

use tokio::time::timeout;

use super::models::UsageCandidate;
use super::provider::Provider;
use crate::error::{MuxError, Result};
use crate::providers;
use crate::storage::Config;

/// One adapter failure, kept for diagnostics.
#[derive(Debug)]
pub struct FetchFailure {
    pub provider: Provider,
    pub reason: String,
}

/// Result of one aggregation pass.
#[derive(Debug, Default)]
pub struct AggregateOutcome {
    pub candidates: Vec<UsageCandidate>,
    pub failures: Vec<FetchFailure>,
}

/// Fetch all enabled providers and flatten their windows into candidates.
pub async fn collect_candidates(config: &Config) -> AggregateOutcome {
    let enabled: Vec<Provider> = Provider::ALL
        .iter()
        .copied()
        .filter(|p| !config.is_disabled(*p))
        .collect();

    let fetches = enabled.iter().map(|&p| fetch_with_timeout(p));
    let results = futures::future::join_all(fetches).await;

    let mut outcome = AggregateOutcome::default();
    for (provider, result) in enabled.into_iter().zip(results) {
        match result {
            Ok(report) => {
                tracing::debug!(
                    provider = %provider,
                    windows = report.windows.len(),
                    "Fetched usage report"
                );
                for window in &report.windows {
                    outcome
                        .candidates
                        .push(UsageCandidate::from_window(&report, window));
                }
            }
            Err(e) => {
                tracing::info!(provider = %provider, error = %e, "Provider unavailable");
                outcome.failures.push(FetchFailure {
                    provider,
                    reason: e.to_string(),
                });
            }
        }
    }

    outcome
}

async fn fetch_with_timeout(provider: Provider) -> Result<crate::core::models::UsageReport> {
    let bound = provider.default_timeout();
    match timeout(bound, providers::fetch_usage(provider)).await {
        Ok(result) => result,
        Err(_) => Err(MuxError::Timeout {
            provider: provider.cli_name().to_string(),
            seconds: bound.as_secs(),
        }),
    }
}
