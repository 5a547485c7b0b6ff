//! Domain records exchanged between the directories and the engine.
//!
//! These are the read-side shapes the directory contracts return.  Derived
//! artifacts (shifts, vehicle runs, cards) live in the crates that produce
//! them; what belongs here is only what more than one crate consumes.

use crate::geo::GeoPoint;
use crate::ids::{OccurrenceId, ParticipantId, ProgramId, StaffId, VehicleId};
use crate::time::{Date, TimeWindow};

// ── Occurrence ───────────────────────────────────────────────────────────────

/// One dated, timed run of a recurring program.
///
/// Created by the scheduling roll-forward process; the engine only ever
/// attaches derived summary fields to it, never deletes it.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Occurrence {
    pub id: OccurrenceId,
    pub program: ProgramId,
    pub date: Date,
    pub window: TimeWindow,
    /// Geocoded venue location, if known.  Absent venues degrade the route
    /// sequencer (stop order is left as given), nothing else.
    pub venue: Option<GeoPoint>,
}

/// Derived summary fields written back onto the occurrence row after a
/// processing pass.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct OccurrenceSummary {
    pub participant_count: u32,
    pub staff_count: u32,
    pub revenue: f64,
    pub staff_cost: f64,
    pub admin_cost: f64,
    pub profit: f64,
    pub margin: f64,
    /// Unix seconds of the pass that produced this summary.
    pub processed_unix: i64,
}

// ── Participant allocation ───────────────────────────────────────────────────

/// Lifecycle state of a participant's link to an occurrence.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AllocationStatus {
    Confirmed,
    Cancelled,
}

impl AllocationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AllocationStatus::Confirmed => "CONFIRMED",
            AllocationStatus::Cancelled => "CANCELLED",
        }
    }
}

/// One billed service line on an allocation: `rate × hours`.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct BillingLine {
    pub rate: f64,
    pub hours: f64,
}

impl BillingLine {
    /// The line's revenue contribution.  Missing or negative inputs read as
    /// zero so the financial arithmetic stays total.
    pub fn amount(&self) -> f64 {
        self.rate.max(0.0) * self.hours.max(0.0)
    }
}

/// A confirmed (or cancelled) link between a participant and an occurrence.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct ParticipantAllocation {
    pub participant: ParticipantId,
    pub occurrence: OccurrenceId,
    pub status: AllocationStatus,
    /// Fractional staffing weight, ≥ 1.0 when present.  `None` means the
    /// enrollment record never captured one; readers substitute the
    /// configured minimum.
    pub supervision_multiplier: Option<f64>,
    pub pickup_required: bool,
    pub dropoff_required: bool,
    pub wheelchair_required: bool,
    /// Geocoded home address for routing, if known.
    pub home: Option<GeoPoint>,
    pub billing_lines: Vec<BillingLine>,
}

impl ParticipantAllocation {
    /// The multiplier this allocation contributes to supervision load.
    pub fn multiplier_or(&self, minimum: f64) -> f64 {
        self.supervision_multiplier.unwrap_or(minimum).max(minimum)
    }

    /// `true` if any transport leg is required.
    pub fn needs_transport(&self) -> bool {
        self.pickup_required || self.dropoff_required
    }
}

// ── Staff ────────────────────────────────────────────────────────────────────

/// Employment basis, used as an assignment tiebreaker (casuals first keeps
/// permanent-staff hours in reserve).
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmploymentType {
    Casual,
    Permanent,
}

impl EmploymentType {
    pub fn as_str(self) -> &'static str {
        match self {
            EmploymentType::Casual => "CASUAL",
            EmploymentType::Permanent => "PERMANENT",
        }
    }
}

/// A staff member as returned by the staff directory for one date.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct StaffMember {
    pub id: StaffId,
    /// Qualification level; the lead role prefers candidates at or above the
    /// configured threshold.
    pub level: u8,
    /// Holds the credential required for high-support participant mixes.
    pub high_support_qualified: bool,
    pub employment: EmploymentType,
    pub hourly_rate: f64,
    /// Shifts already assigned to this person on the queried date.
    pub shifts_today: u32,
}

// ── Vehicle ──────────────────────────────────────────────────────────────────

/// A fleet vehicle as returned by the vehicle directory for one date and
/// time window.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub seats: u32,
    pub wheelchair_capacity: u32,
    /// Runs already assigned to this vehicle on the queried date.
    pub runs_today: u32,
}
