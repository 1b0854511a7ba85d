//! Deprecation log
//!
//! Legacy query setters report their use here. Every call is logged at WARN
//! on the `deprecation` target and counted per key.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use once_cell::sync::Lazy;
use serde::Serialize;

static ENTRIES: Lazy<DashMap<String, DeprecationEntry>> = Lazy::new(DashMap::new);

/// One deprecated call site
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeprecationEntry {
    pub key: String,
    pub message: String,
    pub count: u64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

/// Process-wide registry of deprecated API usage
pub struct Deprecator;

impl Deprecator {
    /// Record a use of the deprecated API identified by `key`
    pub fn log(key: &str, message: &str) {
        let now = Utc::now();
        let mut entry = ENTRIES
            .entry(key.to_string())
            .or_insert_with(|| DeprecationEntry {
                key: key.to_string(),
                message: message.to_string(),
                count: 0,
                first_seen: now,
                last_seen: now,
            });
        entry.count += 1;
        entry.last_seen = now;
        let count = entry.count;
        drop(entry);

        tracing::warn!(target: "deprecation", key = %key, count, "{}", message);
    }

    /// Snapshot of every recorded deprecation
    pub fn entries() -> Vec<DeprecationEntry> {
        ENTRIES.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Entry recorded for `key`, if any
    pub fn entry(key: &str) -> Option<DeprecationEntry> {
        ENTRIES.get(key).map(|entry| entry.value().clone())
    }

    /// Forget every recorded deprecation
    pub fn clear() {
        ENTRIES.clear();
    }
}
