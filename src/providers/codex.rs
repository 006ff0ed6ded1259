//! Codex (OpenAI) fetch adapter.
//!
//! Calls `codex limits`. The Codex CLI reports rolling rate windows plus a
//! bonus-credit balance with a relative expiry:
//!
//! ```text
//! 5h limit: 32% used
//! Weekly limit: 120/480 used
//! Bonus credits: 2/10
//! expires in 3 days
//! ```
//!
//! Newer CLI builds also print a summary line ("Bonus credits balance
//! 2/10 remaining") for the same quota; the looser bonus pattern below
//! would match it, and label dedup in [`UsageReport::push_window`] keeps
//! the first capture.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::cli_runner::{CLI_TIMEOUT, run_command};
use crate::core::models::{UsageReport, UsageWindow, clamp_percent};
use crate::core::provider::Provider;
use crate::error::{MuxError, Result};
use crate::util::time::days_left_description;

/// CLI binary name.
const CLI_NAME: &str = "codex";

/// Subcommand printing quota state.
const USAGE_ARGS: &[&str] = &["limits"];

static RE_PERCENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9][\w /&-]*?):\s*(\d+(?:\.\d+)?)%").expect("valid regex")
});

static RE_RATIO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9][\w /&-]*?):\s*(\d+(?:\.\d+)?)\s*/\s*(\d+(?:\.\d+)?)\b")
        .expect("valid regex")
});

/// Looser match for restyled bonus-credit summary lines.
static RE_BONUS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)bonus credits\b\D*(\d+(?:\.\d+)?)\s*/\s*(\d+(?:\.\d+)?)")
        .expect("valid regex")
});

static RE_EXPIRES_IN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)expires in (\d+) days?").expect("valid regex"));

/// Check if the Codex CLI is available.
fn is_available() -> bool {
    which::which(CLI_NAME).is_ok()
}

/// Fetch usage via the Codex CLI.
pub async fn fetch() -> Result<UsageReport> {
    if !is_available() {
        return Err(MuxError::CliNotFound {
            name: CLI_NAME.to_string(),
        });
    }

    let output = run_command(CLI_NAME, USAGE_ARGS, CLI_TIMEOUT).await?;
    if !output.success() {
        return Err(MuxError::FetchFailed {
            provider: CLI_NAME.to_string(),
            reason: format!("exit code {}: {}", output.exit_code, output.stderr.trim()),
        });
    }
    if output.stdout.trim().is_empty() {
        return Err(MuxError::FetchFailed {
            provider: CLI_NAME.to_string(),
            reason: "empty output".to_string(),
        });
    }

    Ok(parse_limits_output(&output.stdout))
}

/// Parse `codex limits` text. Best-effort: unrecognized lines are skipped.
fn parse_limits_output(output: &str) -> UsageReport {
    let mut report = UsageReport::new(Provider::Codex);

    for line in output.lines().map(str::trim) {
        if let Some(caps) = RE_PERCENT.captures(line) {
            report.push_window(UsageWindow::new(caps[1].trim(), caps[2].parse().unwrap_or(0.0)));
            continue;
        }

        if let Some(caps) = RE_RATIO.captures(line) {
            let used: f64 = caps[2].parse().unwrap_or(0.0);
            let total: f64 = caps[3].parse().unwrap_or(0.0);
            if total > 0.0 {
                report.push_window(UsageWindow::new(
                    caps[1].trim(),
                    clamp_percent(100.0 * used / total),
                ));
            }
            continue;
        }

        if let Some(caps) = RE_BONUS.captures(line) {
            let used: f64 = caps[1].parse().unwrap_or(0.0);
            let total: f64 = caps[2].parse().unwrap_or(0.0);
            if total > 0.0 {
                report.push_window(UsageWindow::new(
                    "Bonus credits",
                    clamp_percent(100.0 * used / total),
                ));
            }
            continue;
        }

        if let Some(caps) = RE_EXPIRES_IN.captures(line) {
            if let Ok(days) = caps[1].parse::<i64>() {
                if let Some(window) = report.last_window_mut() {
                    if window.reset_description.is_none() {
                        window.reset_description = Some(days_left_description(days));
                    }
                }
            }
            continue;
        }

        tracing::trace!(provider = CLI_NAME, line, "Skipping unrecognized line");
    }

    report
}
