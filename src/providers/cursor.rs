//! Cursor fetch adapter.
//!
//! Calls `cursor usage`. Cursor talks about renewal rather than reset and
//! mixes request counts with percentage meters:
//!
//! ```text
//! Premium requests: 320/500
//! Usage-based pricing: 20% used (renews on 07/01)
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
const CLI_NAME: &str = "cursor";

/// Subcommand printing quota state.
const USAGE_ARGS: &[&str] = &["usage"];

static RE_RATIO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z][\w /&-]*?):\s*(\d+(?:\.\d+)?)\s*/\s*(\d+(?:\.\d+)?)\b")
        .expect("valid regex")
});

static RE_PERCENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z][\w /&-]*?):\s*(\d+(?:\.\d+)?)%").expect("valid regex")
});

static RE_RENEWS_ON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:renews|resets) on (\d{1,2})/(\d{1,2})").expect("valid regex")
});

/// Check if the Cursor CLI is available.
fn is_available() -> bool {
    which::which(CLI_NAME).is_ok()
}

/// Fetch usage via the Cursor CLI.
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

    Ok(parse_usage_output(&output.stdout))
}

/// Parse `cursor usage` text. Renewal dates may appear inline on any
/// quota line.
fn parse_usage_output(output: &str) -> UsageReport {
    let now = Utc::now();
    let mut report = UsageReport::new(Provider::Cursor);

    for line in output.lines().map(str::trim) {
        let renews_at = RE_RENEWS_ON.captures(line).and_then(|caps| {
            caps[1]
                .parse()
                .ok()
                .zip(caps[2].parse().ok())
                .and_then(|(month, day)| next_month_day(now, month, day))
        });

        if let Some(caps) = RE_RATIO.captures(line) {
            let used: f64 = caps[2].parse().unwrap_or(0.0);
            let total: f64 = caps[3].parse().unwrap_or(0.0);
            if total > 0.0 {
                let mut window =
                    UsageWindow::new(caps[1].trim(), clamp_percent(100.0 * used / total));
                window.resets_at = renews_at;
                report.push_window(window);
            }
            continue;
        }

        if let Some(caps) = RE_PERCENT.captures(line) {
            let mut window = UsageWindow::new(caps[1].trim(), caps[2].parse().unwrap_or(0.0));
            window.resets_at = renews_at;
            report.push_window(window);
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
    fn parses_mixed_quota_styles() {
        let report = parse_usage_output(
            "Premium requests: 320/500\nUsage-based pricing: 20% used (renews on 07/01)\n",
        );
        assert_eq!(report.windows.len(), 2);
        assert!((report.windows[0].used_percent - 64.0).abs() < f64::EPSILON);
        assert!(report.windows[0].resets_at.is_none());

        let renewal = report.windows[1].resets_at.expect("resets_at");
        assert_eq!(renewal.month(), 7);
        assert_eq!(renewal.day(), 1);
    }

    #[test]
    fn accepts_resets_wording_too() {
        let report = parse_usage_output("Premium requests: 10/500 (resets on 12/01)\n");
        assert!(report.windows[0].resets_at.is_some());
    }

    #[test]
    fn unrecognized_banner_is_skipped() {
        let report = parse_usage_output("Cursor v0.44\nSigned in\nPremium requests: 0/500\n");
        assert_eq!(report.windows.len(), 1);
        assert!(report.windows[0].resets_at.is_none());
        assert!((report.windows[0].used_percent).abs() < f64::EPSILON);
    }
}
