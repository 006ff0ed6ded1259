//! Provider fetch adapters.
//!
//! One module per provider, each behind the same `fetch() -> UsageReport`
//! contract. Every adapter invokes its provider's CLI, captures stdout, and
//! parses the provider-specific text dialect with its own pattern table.
//! New providers are added by implementing a new module and registering it
//! in [`fetch_usage`], not by branching inside shared parsing code.

pub mod claude;
pub mod codex;
pub mod cursor;
pub mod gemini;

use crate::core::models::UsageReport;
use crate::core::provider::Provider;
use crate::error::Result;

/// Fetch the usage report for one provider via its adapter.
pub async fn fetch_usage(provider: Provider) -> Result<UsageReport> {
    match provider {
        Provider::Claude => claude::fetch().await,
        Provider::Codex => codex::fetch().await,
        Provider::Gemini => gemini::fetch().await,
        Provider::Cursor => cursor::fetch().await,
    }
}
