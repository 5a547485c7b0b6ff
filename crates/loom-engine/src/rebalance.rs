//! The day rebalancer — bulk re-derivation for one date.
//!
//! Occurrences are processed strictly in start-time order, each pass fully
//! committed before the next begins.  That invariant is what lets the Nth
//! occurrence see the shift and run rows left by occurrence N−1 when the
//! directories count same-day usage — without it the same staff member or
//! vehicle could be double-assigned within one rebalance.

use loom_core::{Date, OccurrenceId};
use serde_json::json;
use tracing::{info, warn};

use crate::audit::AuditEntry;
use crate::error::{EngineError, EngineResult};
use crate::processor::{process_occurrence, ProcessOutcome};
use crate::store::EngineStore;

/// What one rebalance run did.
#[derive(Debug, Default)]
pub struct RebalanceReport {
    /// Successful passes, in processing (start-time) order.
    pub processed: Vec<ProcessOutcome>,
    /// Occurrences whose pass failed; later occurrences still ran.
    pub failures: Vec<(OccurrenceId, EngineError)>,
}

/// Reprocess every occurrence scheduled on `date`.
///
/// Per-occurrence failures are collected, not propagated — each pass is
/// independently transactional, so a failed occurrence leaves its prior
/// derived state intact while the rest of the day is still rebalanced.
pub fn rebalance_day<S: EngineStore>(store: &mut S, date: Date) -> EngineResult<RebalanceReport> {
    let mut occurrences = store.occurrences_on(date)?;
    // Strict start-time order; occurrence ID breaks ties deterministically.
    occurrences.sort_by_key(|o| (o.window.start, o.id));

    let mut report = RebalanceReport::default();
    for occurrence in &occurrences {
        match process_occurrence(store, occurrence.id) {
            Ok(outcome) => report.processed.push(outcome),
            Err(e) => {
                warn!(occurrence = %occurrence.id, error = %e, "rebalance pass failed");
                report.failures.push((occurrence.id, e));
            }
        }
    }

    store.append_audit(&AuditEntry::new(
        "REBALANCE_DAY",
        json!({
            "date": date.to_string(),
            "occurrences": occurrences.len(),
            "processed": report.processed.len(),
            "failed": report.failures.len(),
        }),
    ))?;

    info!(
        %date,
        processed = report.processed.len(),
        failed = report.failures.len(),
        "day rebalanced"
    );
    Ok(report)
}
