//! Gemini (Google) fetch adapter.
//!
//! Calls `gemini quota`. Gemini prints the signed-in account up front and
//! one shared reset date for all daily buckets at the end:
//!
//! ```text
//! Quota for user@example.com
//! Daily requests: 150/1000
//! Model tokens: 12% used
//! Resets on 03/15
//! ```

use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;

use crate::core::cli_runner::{CLI_TIMEOUT, run_command};
use crate::core::models::{UsageReport, UsageWindow, clamp_percent};
use crate::core::provider::Provider;
use crate::error::{MuxError, Result};
use crate::util::time::next_month_day;

/// CLI binary name.
const CLI_NAME: &str = "gemini";

/// Subcommand printing quota state.
const USAGE_ARGS: &[&str] = &["quota"];

static RE_ACCOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^quota for (\S+@\S+)$").expect("valid regex"));

static RE_RATIO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z][\w /&-]*?):\s*(\d+(?:\.\d+)?)\s*/\s*(\d+(?:\.\d+)?)\b")
        .expect("valid regex")
});

static RE_PERCENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z][\w /&-]*?):\s*(\d+(?:\.\d+)?)%").expect("valid regex")
});

static RE_RESETS_ON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^resets on (\d{1,2})/(\d{1,2})$").expect("valid regex"));

/// Check if the Gemini CLI is available.
fn is_available() -> bool {
    which::which(CLI_NAME).is_ok()
}

/// Fetch usage via the Gemini CLI.
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

    Ok(parse_quota_output(&output.stdout))
}

/// Parse `gemini quota` text. The trailing `Resets on MM/DD` line applies
/// to every window that has no reset info of its own.
fn parse_quota_output(output: &str) -> UsageReport {
    let now = Utc::now();
    let mut report = UsageReport::new(Provider::Gemini);

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
                report.push_window(UsageWindow::new(
                    caps[1].trim(),
                    clamp_percent(100.0 * used / total),
                ));
            }
            continue;
        }

        if let Some(caps) = RE_PERCENT.captures(line) {
            report.push_window(UsageWindow::new(caps[1].trim(), caps[2].parse().unwrap_or(0.0)));
            continue;
        }

        if let Some(caps) = RE_RESETS_ON.captures(line) {
            let resets_at = caps[1]
                .parse()
                .ok()
                .zip(caps[2].parse().ok())
                .and_then(|(month, day)| next_month_day(now, month, day));
            if let Some(resets_at) = resets_at {
                for window in &mut report.windows {
                    if window.resets_at.is_none() {
                        window.resets_at = Some(resets_at);
                    }
                }
            }
            continue;
        }

        tracing::trace!(provider = CLI_NAME, line, "Skipping unrecognized line");
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn parses_account_and_windows() {
        let report = parse_quota_output(
            "Quota for user@example.com\nDaily requests: 150/1000\nModel tokens: 12% used\n",
        );
        assert_eq!(report.account.as_deref(), Some("user@example.com"));
        assert_eq!(report.windows.len(), 2);
        assert!((report.windows[0].used_percent - 15.0).abs() < f64::EPSILON);
        assert!((report.windows[1].used_percent - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn trailing_reset_applies_to_all_windows() {
        let report = parse_quota_output(
            "Daily requests: 150/1000\nModel tokens: 12% used\nResets on 03/15\n",
        );
        for window in &report.windows {
            let resets_at = window.resets_at.expect("resets_at");
            assert_eq!(resets_at.month(), 3);
            assert_eq!(resets_at.day(), 15);
        }
    }

    #[test]
    fn report_without_quotas_is_valid() {
        let report = parse_quota_output("Quota for user@example.com\nNo active quotas.\n");
        assert!(report.windows.is_empty());
        assert_eq!(report.account.as_deref(), Some("user@example.com"));
    }
}
