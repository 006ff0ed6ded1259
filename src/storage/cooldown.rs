//! Persisted cooldown store.
//!
//! A skipped candidate's key is excluded from selection until its expiry
//! passes. The store is a JSON object at a fixed per-user path mapping
//! cooldown key to expiry timestamp; it is loaded once per orchestration
//! cycle and read-modify-written by a single active process. Concurrent
//! external writers can race; last-writer-wins is accepted for a
//! low-stakes cooldown hint.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use super::statefile;
use crate::error::Result;

/// Default cooldown placed on a skipped candidate.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(30 * 60);

/// Persisted key→expiry map.
#[derive(Debug)]
pub struct CooldownStore {
    path: PathBuf,
    entries: BTreeMap<String, DateTime<Utc>>,
}

impl CooldownStore {
    /// Load the store from disk. Missing or corrupt state loads as empty
    /// (fail-open); a fresh file is written on the next flush.
    #[must_use]
    pub fn load(path: PathBuf) -> Self {
        let raw: Option<BTreeMap<String, Value>> = statefile::read_json(&path);
        let entries = raw
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(key, value)| parse_expiry(&value).map(|expires_at| (key, expires_at)))
            .collect();
        Self { path, entries }
    }

    /// True iff an entry exists for `key` and `now` is before its expiry.
    #[must_use]
    pub fn is_cooling_down(&self, key: &str, now: DateTime<Utc>) -> bool {
        self.entries.get(key).is_some_and(|expires_at| now < *expires_at)
    }

    /// Upsert `key` with `expires_at = now + duration`.
    pub fn put_cooldown(&mut self, key: &str, duration: Duration, now: DateTime<Utc>) {
        let expires_at = now
            + chrono::Duration::from_std(duration).unwrap_or_else(|_| chrono::Duration::zero());
        self.entries.insert(key.to_string(), expires_at);
    }

    /// Active (non-expired) entries, for display.
    #[must_use]
    pub fn active(&self, now: DateTime<Utc>) -> Vec<(&str, DateTime<Utc>)> {
        self.entries
            .iter()
            .filter(|(_, expires_at)| now < **expires_at)
            .map(|(key, expires_at)| (key.as_str(), *expires_at))
            .collect()
    }

    /// Drop all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Persist the store, purging expired entries to keep it bounded.
    /// Expiries are written as RFC3339.
    pub fn flush(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.entries.retain(|_, expires_at| now < *expires_at);
        let serializable: BTreeMap<&str, String> = self
            .entries
            .iter()
            .map(|(key, expires_at)| (key.as_str(), expires_at.to_rfc3339()))
            .collect();
        statefile::write_json(&self.path, &serializable)
    }
}

/// Expiry values accept RFC3339 strings or integer epoch seconds; anything
/// else is ignored without raising.
fn parse_expiry(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single()),
        _ => None,
    }
}
