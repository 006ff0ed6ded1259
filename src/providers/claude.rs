//! Claude (Anthropic) fetch adapter.
//!
//! Calls `claude limits` and parses its plain-text output. Recognized
//! shapes, one per line:
//!
//! ```text
//! Account: dev@example.com
//! Current session: 25% used
//! Weekly limit: 120/480
//! Opus weekly: 10% used (resets on 06/01)
//! resets on 02/10
//! ```
//!
//! A standalone `resets on MM/DD` line attaches to the most recent window
//! that has no reset info yet. Unrecognized lines are skipped.

use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;

use crate::core::cli_runner::{CLI_TIMEOUT, run_command};
use crate::core::models::{UsageReport, UsageWindow, clamp_percent};
use crate::core::provider::Provider;
use crate::error::{MuxError, Result};
use crate::util::time::next_month_day;

/// CLI binary name.
const CLI_NAME: &str = "claude";

/// Subcommand printing quota state.
const USAGE_ARGS: &[&str] = &["limits"];

static RE_ACCOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^account:\s*(\S+)$").expect("valid regex"));

static RE_RATIO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z][\w /&-]*?):\s*(\d+(?:\.\d+)?)\s*/\s*(\d+(?:\.\d+)?)\b")
        .expect("valid regex")
});

static RE_PERCENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z][\w /&-]*?):\s*(\d+(?:\.\d+)?)%").expect("valid regex")
});

static RE_RESETS_ON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)resets on (\d{1,2})/(\d{1,2})").expect("valid regex"));

/// Check if the Claude CLI is available.
fn is_available() -> bool {
    which::which(CLI_NAME).is_ok()
}

/// Fetch usage via the Claude CLI.
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

/// Parse `claude limits` text. Best-effort: unrecognized lines are skipped.
fn parse_limits_output(output: &str) -> UsageReport {
    let now = Utc::now();
    let mut report = UsageReport::new(Provider::Claude);

    for line in output.lines().map(str::trim) {
        if report.account.is_none() {
            if let Some(caps) = RE_ACCOUNT.captures(line) {
                report.account = Some(caps[1].to_string());
                continue;
            }
        }

        if let Some(caps) = RE_RATIO.captures(line) {
            let used: f64 = caps[2].parse().unwrap_or(0.0);
            let total: f64 = caps[3].parse().unwrap_or(0.0);
            if total > 0.0 {
                let mut window = UsageWindow::new(caps[1].trim(), clamp_percent(100.0 * used / total));
                window.resets_at = parse_inline_reset(line, now);
                report.push_window(window);
            }
            continue;
        }

        if let Some(caps) = RE_PERCENT.captures(line) {
            let pct: f64 = caps[2].parse().unwrap_or(0.0);
            let mut window = UsageWindow::new(caps[1].trim(), pct);
            window.resets_at = parse_inline_reset(line, now);
            report.push_window(window);
            continue;
        }

        // Standalone reset line applies to the most recent window
        if let Some(resets_at) = parse_inline_reset(line, now) {
            if let Some(window) = report.last_window_mut() {
                if window.resets_at.is_none() {
                    window.resets_at = Some(resets_at);
                }
            }
            continue;
        }

        tracing::trace!(provider = CLI_NAME, line, "Skipping unrecognized line");
    }

    report
}

fn parse_inline_reset(
    line: &str,
    now: chrono::DateTime<Utc>,
) -> Option<chrono::DateTime<Utc>> {
    let caps = RE_RESETS_ON.captures(line)?;
    let month: u32 = caps[1].parse().ok()?;
    let day: u32 = caps[2].parse().ok()?;
    next_month_day(now, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn parses_percent_and_ratio_lines() {
        let report = parse_limits_output(
            "Model A Quota: 50/100\nModel B Usage: 75%\n",
        );

        assert_eq!(report.windows.len(), 2);
        assert_eq!(report.windows[0].label, "Model A Quota");
        assert!((report.windows[0].used_percent - 50.0).abs() < f64::EPSILON);
        assert_eq!(report.windows[1].label, "Model B Usage");
        assert!((report.windows[1].used_percent - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn skips_unrecognized_lines() {
        let report = parse_limits_output(
            "Claude CLI v2.1.0\n==========\nCurrent session: 25% used\nPlan: Max\n",
        );
        assert_eq!(report.windows.len(), 1);
        assert_eq!(report.windows[0].label, "Current session");
    }

    #[test]
    fn captures_account_line() {
        let report = parse_limits_output("Account: dev@example.com\nWeekly limit: 120/480\n");
        assert_eq!(report.account.as_deref(), Some("dev@example.com"));
        assert!((report.windows[0].used_percent - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn inline_reset_attaches_to_its_window() {
        let report = parse_limits_output("Opus weekly: 10% used (resets on 06/01)\n");
        let window = &report.windows[0];
        let resets_at = window.resets_at.expect("resets_at");
        assert_eq!(resets_at.month(), 6);
        assert_eq!(resets_at.day(), 1);
    }

    #[test]
    fn standalone_reset_attaches_to_last_window() {
        let report = parse_limits_output("Weekly limit: 30% used\nresets on 02/10\n");
        let resets_at = report.windows[0].resets_at.expect("resets_at");
        assert_eq!(resets_at.month(), 2);
        assert_eq!(resets_at.day(), 10);

        let today = Utc::now().date_naive();
        assert!(resets_at.date_naive() >= today);
    }

    #[test]
    fn standalone_reset_does_not_overwrite_existing() {
        let report = parse_limits_output(
            "Weekly limit: 30% used (resets on 06/01)\nresets on 02/10\n",
        );
        assert_eq!(report.windows[0].resets_at.unwrap().month(), 6);
    }

    #[test]
    fn zero_denominator_ratio_is_dropped() {
        let report = parse_limits_output("Weekly limit: 0/0\n");
        assert!(report.windows.is_empty());
    }

    #[test]
    fn empty_output_yields_empty_report() {
        let report = parse_limits_output("");
        assert!(report.windows.is_empty());
        assert!(report.account.is_none());
    }

    #[test]
    fn ratio_out_of_range_is_clamped() {
        let report = parse_limits_output("Session: 150/100\n");
        assert!((report.windows[0].used_percent - 100.0).abs() < f64::EPSILON);
    }
}
