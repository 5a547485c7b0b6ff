//! Card generation — a pure derivation from one occurrence's assignments.
//!
//! # Window arithmetic
//!
//! Pickup windows sit before the occurrence: the window ends
//! `activity_padding_before` minutes before the occurrence starts and opens
//! `max(min_pickup_duration, pickups × pickup_minutes_per_stop)` minutes
//! earlier, clamped at 00:00.  Dropoff windows mirror this after the
//! occurrence, clamped at 23:59.
//!
//! The first assigned staff member is assumed to also drive, so their roster
//! window stretches from the earliest pickup start to the latest dropoff
//! end.  Everyone else's roster window equals the occurrence window.

use loom_core::{EngineConfig, Occurrence, ParticipantAllocation, ParticipantId, TimeWindow};
use loom_finance::FinancialSummary;
use loom_staffing::StaffAssignment;
use loom_transport::{sequence_stops, Stop, StopKind, VehicleRun};

use crate::card::{Card, CardKind};

/// Derive the full card set for one occurrence.
///
/// Output order is deterministic: activity, pickups (run order), dropoffs
/// (run order), rosters (assignment order).  Empty upstream inputs simply
/// yield fewer cards; there are no failure modes.
pub fn generate_cards(
    occurrence: &Occurrence,
    participants: &[ParticipantAllocation],
    staff: &[StaffAssignment],
    runs: &[VehicleRun],
    financial: &FinancialSummary,
    config: &EngineConfig,
) -> Vec<Card> {
    let mut cards = Vec::new();

    let participant_count = participants.len() as u32;
    let staff_count = staff.len() as u32;

    cards.push(Card {
        kind: CardKind::Activity,
        date: occurrence.date,
        program: occurrence.program,
        occurrence: occurrence.id,
        staff: None,
        vehicle: None,
        window: occurrence.window,
        participant_count,
        staff_count,
        financial: Some(*financial),
        stops: Vec::new(),
    });

    let pickup_stops = stop_order(occurrence, participants, |p| p.pickup_required);
    let dropoff_stops = stop_order(occurrence, participants, |p| p.dropoff_required);

    for run in runs.iter().filter(|r| r.pickups > 0) {
        let duration = (run.pickups * config.pickup_minutes_per_stop).max(config.min_pickup_duration);
        let end = occurrence.window.start.earlier_by(config.activity_padding_before);
        let start = end.earlier_by(duration);
        cards.push(Card {
            kind: CardKind::Pickup,
            date: occurrence.date,
            program: occurrence.program,
            occurrence: occurrence.id,
            staff: None,
            vehicle: Some(run.vehicle),
            window: TimeWindow::new(start, end),
            participant_count: run.pickups,
            staff_count: 0,
            financial: None,
            stops: pickup_stops.clone(),
        });
    }

    for run in runs.iter().filter(|r| r.dropoffs > 0) {
        let duration =
            (run.dropoffs * config.pickup_minutes_per_stop).max(config.min_dropoff_duration);
        let start = occurrence.window.end.later_by(config.activity_padding_after);
        let end = start.later_by(duration);
        cards.push(Card {
            kind: CardKind::Dropoff,
            date: occurrence.date,
            program: occurrence.program,
            occurrence: occurrence.id,
            staff: None,
            vehicle: Some(run.vehicle),
            window: TimeWindow::new(start, end),
            participant_count: run.dropoffs,
            staff_count: 0,
            financial: None,
            stops: dropoff_stops.clone(),
        });
    }

    // Roster windows: the first staff member covers the whole transport span.
    let earliest_pickup_start = cards
        .iter()
        .filter(|c| c.kind == CardKind::Pickup)
        .map(|c| c.window.start)
        .min()
        .unwrap_or(occurrence.window.start);
    let latest_dropoff_end = cards
        .iter()
        .filter(|c| c.kind == CardKind::Dropoff)
        .map(|c| c.window.end)
        .max()
        .unwrap_or(occurrence.window.end);

    for (i, assignment) in staff.iter().enumerate() {
        let window = if i == 0 {
            TimeWindow::new(earliest_pickup_start, latest_dropoff_end)
        } else {
            occurrence.window
        };
        cards.push(Card {
            kind: CardKind::Roster,
            date: occurrence.date,
            program: occurrence.program,
            occurrence: occurrence.id,
            staff: Some(assignment.staff),
            vehicle: None,
            window,
            participant_count,
            staff_count,
            financial: None,
            stops: Vec::new(),
        });
    }

    cards
}

/// Route-sequenced participant order for one transport leg.
///
/// With a geocoded venue the stops run nearest-neighbor from it; without
/// one, or for participants with no geocoded home, directory order is kept.
fn stop_order(
    occurrence: &Occurrence,
    participants: &[ParticipantAllocation],
    leg: impl Fn(&ParticipantAllocation) -> bool,
) -> Vec<ParticipantId> {
    let riders: Vec<&ParticipantAllocation> = participants.iter().filter(|p| leg(p)).collect();
    if riders.is_empty() {
        return Vec::new();
    }

    let homes: Option<Vec<_>> = riders.iter().map(|p| p.home).collect();
    let (Some(venue), Some(homes)) = (occurrence.venue, homes) else {
        return riders.iter().map(|p| p.participant).collect();
    };

    let mut stops = Vec::with_capacity(riders.len() + 1);
    stops.push(Stop::venue(venue));
    for (p, home) in riders.iter().zip(homes) {
        stops.push(Stop::participant(p.participant, home));
    }

    sequence_stops(stops)
        .into_iter()
        .filter_map(|s| match s.kind {
            StopKind::Participant(id) => Some(id),
            StopKind::Venue => None,
        })
        .collect()
}
