//! Append-only audit entries.

use std::time::{SystemTime, UNIX_EPOCH};

/// One audit-log row: what happened, structured detail, and when.
///
/// Entries are append-only; nothing in the engine ever reads one back.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize)]
pub struct AuditEntry {
    /// Action tag, e.g. `PROCESS_OCCURRENCE`, `CANCEL_PARTICIPANT`.
    pub action: &'static str,
    /// Structured detail payload, persisted as JSON.
    pub detail: serde_json::Value,
    /// Unix seconds at which the entry was composed.
    pub recorded_unix: i64,
}

impl AuditEntry {
    pub fn new(action: &'static str, detail: serde_json::Value) -> Self {
        Self { action, detail, recorded_unix: unix_now() }
    }
}

/// Current Unix time in seconds; 0 if the system clock predates the epoch.
pub(crate) fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
