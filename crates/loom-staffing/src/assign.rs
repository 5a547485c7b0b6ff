//! Staff assignment for one occurrence.
//!
//! # Pool model
//!
//! Candidates are pulled from the [`StaffDirectory`], ranked once, and held
//! in an owned `Vec`.  Selection removes the chosen candidate by index, so
//! the "assigned" and "remaining" views can never alias.  Running out of
//! candidates is a reported shortfall, not an error: the roster is returned
//! short and the caller surfaces the warning.

use loom_core::{Date, EmploymentType, EngineConfig, Occurrence, OccurrenceId, StaffId, StaffMember};
use tracing::warn;

use crate::requirement::StaffRequirement;
use crate::StaffingResult;

// ── Directory contract ───────────────────────────────────────────────────────

/// Read-side contract for the staff directory.
///
/// Implementations return staff active on `date`, net of recorded absences,
/// with that day's existing shift counts filled in.  Shifts belonging to
/// `exclude` are left out of the counts — when an occurrence is reprocessed,
/// its own previous shifts must not bias the ranking, or reprocessing would
/// not be idempotent.  Order must be deterministic (the store orders by
/// staff ID).
pub trait StaffDirectory {
    fn active_staff(
        &self,
        date: Date,
        exclude: Option<OccurrenceId>,
    ) -> StaffingResult<Vec<StaffMember>>;
}

// ── Assignment output ────────────────────────────────────────────────────────

/// Role a staff member holds on one occurrence.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftRole {
    Lead,
    Support,
}

impl ShiftRole {
    pub fn as_str(self) -> &'static str {
        match self {
            ShiftRole::Lead => "LEAD",
            ShiftRole::Support => "SUPPORT",
        }
    }
}

/// One concrete staff assignment produced for an occurrence.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct StaffAssignment {
    pub staff: StaffId,
    pub role: ShiftRole,
    pub hourly_rate: f64,
    pub level: u8,
}

/// The assignor's result: a possibly-short roster plus the unfilled slot
/// count.
#[derive(Clone, Debug, PartialEq)]
pub struct StaffingOutcome {
    pub assignments: Vec<StaffAssignment>,
    /// Requested slots that could not be filled.
    pub shortfall: u32,
}

// ── Assignor ─────────────────────────────────────────────────────────────────

/// Assign staff to `occurrence` per `requirement`.
///
/// Candidates are ranked ascending by (shifts already worked today,
/// casual-before-permanent).  A high-support participant mix narrows the
/// pool to credentialed staff, falling back to the full pool (logged) when
/// that empties it.  The lead slot prefers the highest-ranked candidate at
/// or above the configured qualification level; support slots fill greedily
/// until the pool runs dry.
pub fn assign_staff<D: StaffDirectory>(
    directory: &D,
    occurrence: &Occurrence,
    requirement: &StaffRequirement,
    config: &EngineConfig,
) -> StaffingResult<StaffingOutcome> {
    if requirement.total_staff_needed == 0 {
        return Ok(StaffingOutcome { assignments: Vec::new(), shortfall: 0 });
    }

    let mut pool = directory.active_staff(occurrence.date, Some(occurrence.id))?;
    rank(&mut pool);

    if requirement.high_support_participants > 0 {
        let qualified: Vec<StaffMember> = pool
            .iter()
            .filter(|s| s.high_support_qualified)
            .cloned()
            .collect();
        if qualified.is_empty() {
            warn!(
                occurrence = %occurrence.id,
                "no high-support qualified staff available, using unfiltered pool"
            );
        } else {
            pool = qualified;
        }
    }

    let mut assignments = Vec::with_capacity(requirement.total_staff_needed as usize);

    if requirement.needs_lead && !pool.is_empty() {
        // Prefer the best-ranked candidate meeting the lead qualification
        // level; otherwise take whoever ranks first.
        let idx = pool
            .iter()
            .position(|s| s.level >= config.lead_level_threshold)
            .unwrap_or(0);
        let chosen = pool.remove(idx);
        assignments.push(StaffAssignment {
            staff: chosen.id,
            role: ShiftRole::Lead,
            hourly_rate: chosen.hourly_rate,
            level: chosen.level,
        });
    }

    for _ in 0..requirement.support_staff_count {
        if pool.is_empty() {
            break;
        }
        let chosen = pool.remove(0);
        assignments.push(StaffAssignment {
            staff: chosen.id,
            role: ShiftRole::Support,
            hourly_rate: chosen.hourly_rate,
            level: chosen.level,
        });
    }

    let shortfall = requirement.total_staff_needed - assignments.len() as u32;
    if shortfall > 0 {
        warn!(
            occurrence = %occurrence.id,
            requested = requirement.total_staff_needed,
            assigned = assignments.len(),
            shortfall,
            "staff pool exhausted before all slots were filled"
        );
    }

    Ok(StaffingOutcome { assignments, shortfall })
}

/// Rank ascending by (shifts today, casual-before-permanent, staff ID).
///
/// The trailing ID key pins a total order so ranking never depends on the
/// directory's row order.
fn rank(pool: &mut [StaffMember]) {
    pool.sort_by_key(|s| {
        (
            s.shifts_today,
            match s.employment {
                EmploymentType::Casual => 0u8,
                EmploymentType::Permanent => 1,
            },
            s.id,
        )
    });
}
