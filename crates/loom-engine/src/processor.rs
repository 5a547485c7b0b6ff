//! The per-occurrence processing pass.
//!
//! One synchronous pipeline with no intermediate persisted states:
//!
//! ```text
//! load config → load participants → assign staff → assign vehicles
//!             → generate cards → compute financials → persist → done
//! ```
//!
//! Shortfalls along the way (not enough staff, not enough vehicle capacity)
//! are carried through as warnings on the outcome; only the final persist
//! step can fail the pass, and it fails atomically.

use loom_cards::{generate_cards, Card};
use loom_core::{EngineConfig, OccurrenceId, OccurrenceSummary};
use loom_finance::{financial_summary, FinancialSummary};
use loom_staffing::{assign_staff, staff_requirement, StaffAssignment, StaffRequirement};
use loom_transport::{assign_vehicles, VehicleRun};
use serde_json::json;
use tracing::{debug, info};

use crate::audit::{unix_now, AuditEntry};
use crate::error::{EngineError, EngineResult};
use crate::store::{DerivedState, EngineStore, StaffShift};

// ── Outcome types ────────────────────────────────────────────────────────────

/// Non-fatal shortfalls surfaced by one processing pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct ProcessWarnings {
    pub unfilled_staff_slots: u32,
    pub unmet_pickups: u32,
    pub unmet_dropoffs: u32,
    pub unmet_wheelchairs: u32,
}

impl ProcessWarnings {
    /// `true` if the pass met every staffing and transport requirement.
    pub fn is_clean(&self) -> bool {
        *self == ProcessWarnings::default()
    }
}

/// Everything one processing pass derived and persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct ProcessOutcome {
    pub occurrence: OccurrenceId,
    pub requirement: StaffRequirement,
    pub staff: Vec<StaffAssignment>,
    pub runs: Vec<VehicleRun>,
    pub cards: Vec<Card>,
    pub financial: FinancialSummary,
    pub warnings: ProcessWarnings,
}

// ── Processor ────────────────────────────────────────────────────────────────

/// Run one full processing pass for `id` and persist the result.
///
/// Re-running with unchanged inputs is idempotent: the derived rows are
/// replaced with numerically identical ones.  On persistence failure the
/// transaction is rolled back and [`EngineError::Persist`] carries the
/// occurrence ID and cause; the caller may safely retry.
pub fn process_occurrence<S: EngineStore>(
    store: &mut S,
    id: OccurrenceId,
) -> EngineResult<ProcessOutcome> {
    let config = EngineConfig::with_overrides(store.config_overrides()?);
    let occurrence = store
        .occurrence(id)?
        .ok_or(EngineError::OccurrenceNotFound(id))?;
    let participants = store.confirmed_allocations(id)?;

    let requirement = staff_requirement(&participants, &config);
    debug!(occurrence = %id, ?requirement, "staff requirement computed");

    let staffing = assign_staff(&*store, &occurrence, &requirement, &config)?;
    let transport = assign_vehicles(&*store, &occurrence, &participants, &config)?;
    let financial = financial_summary(&occurrence, &participants, &staffing.assignments, &config);
    let cards = generate_cards(
        &occurrence,
        &participants,
        &staffing.assignments,
        &transport.runs,
        &financial,
        &config,
    );

    let warnings = ProcessWarnings {
        unfilled_staff_slots: staffing.shortfall,
        unmet_pickups: transport.unmet_pickups,
        unmet_dropoffs: transport.unmet_dropoffs,
        unmet_wheelchairs: transport.unmet_wheelchairs,
    };

    let shifts: Vec<StaffShift> = staffing
        .assignments
        .iter()
        .map(|a| StaffShift {
            occurrence: id,
            staff: a.staff,
            role: a.role,
            date: occurrence.date,
            window: occurrence.window,
        })
        .collect();

    let summary = OccurrenceSummary {
        participant_count: participants.len() as u32,
        staff_count: staffing.assignments.len() as u32,
        revenue: financial.revenue,
        staff_cost: financial.staff_cost,
        admin_cost: financial.admin_cost,
        profit: financial.profit,
        margin: financial.margin,
        processed_unix: unix_now(),
    };

    let derived = DerivedState {
        occurrence: id,
        date: occurrence.date,
        window: occurrence.window,
        shifts,
        runs: transport.runs.clone(),
        cards: cards.clone(),
        summary,
    };

    let audit = AuditEntry::new(
        "PROCESS_OCCURRENCE",
        json!({
            "occurrence": id.0,
            "date": occurrence.date.to_string(),
            "participants": participants.len(),
            "staff_assigned": staffing.assignments.len(),
            "vehicles_assigned": transport.runs.len(),
            "cards": cards.len(),
            "revenue": financial.revenue,
            "profit": financial.profit,
            "warnings": warnings,
        }),
    );

    store
        .persist_outcome(&derived, &audit)
        .map_err(|e| EngineError::Persist { occurrence: id, cause: e.to_string() })?;

    info!(
        occurrence = %id,
        staff = derived.shifts.len(),
        vehicles = derived.runs.len(),
        cards = derived.cards.len(),
        clean = warnings.is_clean(),
        "occurrence processed"
    );

    Ok(ProcessOutcome {
        occurrence: id,
        requirement,
        staff: staffing.assignments,
        runs: transport.runs,
        cards,
        financial,
        warnings,
    })
}
