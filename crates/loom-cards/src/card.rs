//! The `Card` artifact and its natural key.
//!
//! Cards are UI-facing derived rows, fully regenerated on every processing
//! pass and upserted by natural key — never patched in place.

use loom_core::{Date, OccurrenceId, ParticipantId, ProgramId, StaffId, TimeWindow, VehicleId};
use loom_finance::FinancialSummary;

/// What a card represents.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardKind {
    Activity,
    Pickup,
    Dropoff,
    Roster,
}

impl CardKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CardKind::Activity => "ACTIVITY",
            CardKind::Pickup => "PICKUP",
            CardKind::Dropoff => "DROPOFF",
            CardKind::Roster => "ROSTER",
        }
    }
}

/// One derived scheduling card.
///
/// The upsert key is `(kind, date, program, occurrence, staff-or-zero,
/// vehicle-or-zero)`; `staff` is set on roster cards, `vehicle` on transport
/// cards, neither on the activity card.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Card {
    pub kind: CardKind,
    pub date: Date,
    pub program: ProgramId,
    pub occurrence: OccurrenceId,
    pub staff: Option<StaffId>,
    pub vehicle: Option<VehicleId>,
    pub window: TimeWindow,
    pub participant_count: u32,
    pub staff_count: u32,
    /// Snapshot of the pass's financials; carried on the activity card only.
    pub financial: Option<FinancialSummary>,
    /// Ordered participant stops for transport cards (route-sequenced when
    /// the venue is geocoded, directory order otherwise).
    pub stops: Vec<ParticipantId>,
}
