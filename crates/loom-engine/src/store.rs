//! The `EngineStore` contract: everything the engine asks of persistence.
//!
//! The engine is invoked as a library; the surrounding service supplies an
//! implementation (the workspace ships a SQLite one in `loom-store`).
//! Reads are plain queries; each write method is one transaction — either
//! everything inside commits or nothing does.

use loom_cards::Card;
use loom_core::{
    ConfigValue, Date, Occurrence, OccurrenceId, OccurrenceSummary, ParticipantAllocation,
    ParticipantId, StaffId, TimeWindow,
};
use loom_staffing::{ShiftRole, StaffDirectory};
use loom_transport::{VehicleDirectory, VehicleRun};

use crate::audit::AuditEntry;
use crate::error::EngineResult;

// ── Derived rows ─────────────────────────────────────────────────────────────

/// One staff member's derived shift on one occurrence.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct StaffShift {
    pub occurrence: OccurrenceId,
    pub staff: StaffId,
    pub role: ShiftRole,
    pub date: Date,
    pub window: TimeWindow,
}

/// The complete derived state for one occurrence, replacing whatever a
/// previous pass produced.
///
/// `date` and `window` are carried so the store can denormalize shift and
/// run rows for its same-day and overlap queries.
#[derive(Clone, Debug, PartialEq)]
pub struct DerivedState {
    pub occurrence: OccurrenceId,
    pub date: Date,
    pub window: TimeWindow,
    pub shifts: Vec<StaffShift>,
    pub runs: Vec<VehicleRun>,
    pub cards: Vec<Card>,
    pub summary: OccurrenceSummary,
}

// ── Store contract ───────────────────────────────────────────────────────────

/// Persistence and directory contract consumed by the engine.
///
/// Supertraits cover the staff and vehicle directories so one store value
/// can serve a whole processing pass.
pub trait EngineStore: StaffDirectory + VehicleDirectory {
    /// Typed configuration overrides for category `loom_logic`.
    fn config_overrides(&self) -> EngineResult<Vec<(String, ConfigValue)>>;

    fn occurrence(&self, id: OccurrenceId) -> EngineResult<Option<Occurrence>>;

    /// All occurrences scheduled on `date`, any order (the rebalancer sorts).
    fn occurrences_on(&self, date: Date) -> EngineResult<Vec<Occurrence>>;

    /// Confirmed allocations for one occurrence, in deterministic order.
    fn confirmed_allocations(&self, occurrence: OccurrenceId)
    -> EngineResult<Vec<ParticipantAllocation>>;

    /// Confirmed allocations for one participant across all occurrences on
    /// `date`.
    fn confirmed_allocations_on(
        &self,
        participant: ParticipantId,
        date: Date,
    ) -> EngineResult<Vec<ParticipantAllocation>>;

    /// Occurrences on `date` for which `staff` currently holds a shift.
    fn shift_occurrences_on(&self, staff: StaffId, date: Date) -> EngineResult<Vec<OccurrenceId>>;

    /// Replace the occurrence's derived state, transactionally: upsert
    /// shifts, runs, and cards by natural key, delete stale rows no longer
    /// produced, update the occurrence summary, and append `audit`.
    fn persist_outcome(&mut self, derived: &DerivedState, audit: &AuditEntry) -> EngineResult<()>;

    /// Transactionally cancel the participant's confirmed allocations on
    /// `date`: append an exception record, mark each allocation cancelled,
    /// append `audit`.  Returns the affected occurrence IDs.
    fn cancel_allocations(
        &mut self,
        participant: ParticipantId,
        date: Date,
        reason: &str,
        audit: &AuditEntry,
    ) -> EngineResult<Vec<OccurrenceId>>;

    /// Transactionally record a staff absence for `date`: upsert the absence
    /// (idempotent per staff+date), delete the staff member's shift rows for
    /// the date, append `audit`.  Returns the affected occurrence IDs.
    fn record_absence(
        &mut self,
        staff: StaffId,
        date: Date,
        reason: &str,
        audit: &AuditEntry,
    ) -> EngineResult<Vec<OccurrenceId>>;

    /// Append one audit entry outside any other transaction.
    fn append_audit(&mut self, audit: &AuditEntry) -> EngineResult<()>;
}
