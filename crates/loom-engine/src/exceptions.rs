//! Exception handling: participant cancellations and staff absences.
//!
//! Both entry points follow the same shape: find what the exception touches
//! (zero matches is a no-op success), commit the mutation in one
//! transaction, then reprocess each affected occurrence independently.  The
//! mutation commits first — a reprocessing failure never rolls back the
//! cancellation or absence itself, it is collected on the outcome instead.
//!
//! Both are idempotent: a second identical call finds nothing left to
//! mutate and no-ops.

use loom_core::{Date, OccurrenceId, ParticipantId, StaffId};
use serde_json::json;
use tracing::{info, warn};

use crate::audit::AuditEntry;
use crate::error::{EngineError, EngineResult};
use crate::processor::{process_occurrence, ProcessOutcome};
use crate::store::EngineStore;

/// Result of handling one exception.
#[derive(Debug, Default)]
pub struct ExceptionOutcome {
    /// Occurrences the exception touched (empty for a no-op).
    pub affected: Vec<OccurrenceId>,
    /// Successful reprocessing passes, in occurrence order.
    pub reprocessed: Vec<ProcessOutcome>,
    /// Occurrences whose reprocessing failed; the mutation itself stands.
    pub failures: Vec<(OccurrenceId, EngineError)>,
}

impl ExceptionOutcome {
    /// `true` if the exception matched nothing and changed nothing.
    pub fn is_noop(&self) -> bool {
        self.affected.is_empty()
    }
}

/// Cancel a participant's confirmed allocations on `date`.
pub fn cancel_participant<S: EngineStore>(
    store: &mut S,
    participant: ParticipantId,
    date: Date,
    reason: &str,
) -> EngineResult<ExceptionOutcome> {
    let allocations = store.confirmed_allocations_on(participant, date)?;
    if allocations.is_empty() {
        info!(%participant, %date, "cancellation matched no confirmed allocations, no-op");
        return Ok(ExceptionOutcome::default());
    }

    let occurrences: Vec<u32> = allocations.iter().map(|a| a.occurrence.0).collect();
    let audit = AuditEntry::new(
        "CANCEL_PARTICIPANT",
        json!({
            "participant": participant.0,
            "date": date.to_string(),
            "reason": reason,
            "occurrences": occurrences,
        }),
    );

    let affected = store.cancel_allocations(participant, date, reason, &audit)?;
    info!(%participant, %date, affected = affected.len(), "participant cancelled");

    Ok(reprocess_affected(store, affected))
}

/// Record a staff absence for `date` and release the member's shifts.
pub fn record_staff_absence<S: EngineStore>(
    store: &mut S,
    staff: StaffId,
    date: Date,
    reason: &str,
) -> EngineResult<ExceptionOutcome> {
    let shifts = store.shift_occurrences_on(staff, date)?;
    if shifts.is_empty() {
        info!(%staff, %date, "absence matched no shifts, no-op");
        return Ok(ExceptionOutcome::default());
    }

    let occurrences: Vec<u32> = shifts.iter().map(|o| o.0).collect();
    let audit = AuditEntry::new(
        "STAFF_ABSENCE",
        json!({
            "staff": staff.0,
            "date": date.to_string(),
            "reason": reason,
            "occurrences": occurrences,
        }),
    );

    let affected = store.record_absence(staff, date, reason, &audit)?;
    info!(%staff, %date, affected = affected.len(), "staff absence recorded");

    Ok(reprocess_affected(store, affected))
}

/// Reprocess each affected occurrence, collecting failures instead of
/// propagating them — the committed mutation must stand regardless.
fn reprocess_affected<S: EngineStore>(
    store: &mut S,
    affected: Vec<OccurrenceId>,
) -> ExceptionOutcome {
    let mut outcome = ExceptionOutcome {
        affected: affected.clone(),
        ..ExceptionOutcome::default()
    };

    for id in affected {
        match process_occurrence(store, id) {
            Ok(processed) => outcome.reprocessed.push(processed),
            Err(e) => {
                warn!(occurrence = %id, error = %e, "reprocessing failed after exception");
                outcome.failures.push((id, e));
            }
        }
    }
    outcome
}
