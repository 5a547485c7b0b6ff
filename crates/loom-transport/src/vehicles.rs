//! Vehicle assignment for one occurrence.
//!
//! # Capacity model
//!
//! Each vehicle contributes an effective capacity of
//! `floor(seats × vehicle_capacity_buffer)` — a shared budget across its
//! pickup and dropoff load.  Wheelchair passengers are additionally capped
//! by the vehicle's own wheelchair capacity.  Demand left over after the
//! ranked pool is exhausted is a reported shortfall, not an error.

use loom_core::{
    Date, EngineConfig, Occurrence, OccurrenceId, ParticipantAllocation, TimeWindow, Vehicle,
    VehicleId,
};
use tracing::warn;

use crate::TransportResult;

// ── Directory contract ───────────────────────────────────────────────────────

/// Read-side contract for the vehicle directory.
///
/// Implementations return active vehicles with no run on `date` whose window
/// overlaps `window`, plus each vehicle's same-day run count.  Runs
/// belonging to `exclude` are ignored for both the double-booking check and
/// the counts — an occurrence being reprocessed must not lock out or
/// down-rank its own previous vehicles, or reprocessing would not be
/// idempotent.  Order must be deterministic (the store orders by vehicle
/// ID).
pub trait VehicleDirectory {
    fn available_vehicles(
        &self,
        date: Date,
        window: &TimeWindow,
        exclude: Option<OccurrenceId>,
    ) -> TransportResult<Vec<Vehicle>>;
}

// ── Assignment output ────────────────────────────────────────────────────────

/// One vehicle's derived assignment for an occurrence.
#[derive(Clone, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct VehicleRun {
    pub vehicle: VehicleId,
    pub pickups: u32,
    pub dropoffs: u32,
    pub wheelchairs: u32,
}

/// The assignor's result: runs plus any unmet demand.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct TransportOutcome {
    pub runs: Vec<VehicleRun>,
    pub unmet_pickups: u32,
    pub unmet_dropoffs: u32,
    pub unmet_wheelchairs: u32,
}

impl TransportOutcome {
    /// `true` if every pickup, dropoff, and wheelchair was covered.
    pub fn fully_covered(&self) -> bool {
        self.unmet_pickups == 0 && self.unmet_dropoffs == 0 && self.unmet_wheelchairs == 0
    }
}

// ── Assignor ─────────────────────────────────────────────────────────────────

/// Distribute the occurrence's transport demand across available vehicles.
///
/// Demand is counted from the participants' transport flags; zero demand
/// returns an empty outcome without touching the directory.  Vehicles are
/// ranked ascending by same-day usage then descending by seats; wheelchair
/// demand re-sorts the pool so wheelchair capacity descends first.
pub fn assign_vehicles<D: VehicleDirectory>(
    directory: &D,
    occurrence: &Occurrence,
    participants: &[ParticipantAllocation],
    config: &EngineConfig,
) -> TransportResult<TransportOutcome> {
    let mut remaining_pickups = participants.iter().filter(|p| p.pickup_required).count() as u32;
    let mut remaining_dropoffs = participants.iter().filter(|p| p.dropoff_required).count() as u32;
    let mut remaining_wheelchairs = participants
        .iter()
        .filter(|p| p.wheelchair_required && p.needs_transport())
        .count() as u32;

    if remaining_pickups == 0 && remaining_dropoffs == 0 {
        return Ok(TransportOutcome::default());
    }

    let mut pool =
        directory.available_vehicles(occurrence.date, &occurrence.window, Some(occurrence.id))?;
    rank(&mut pool, remaining_wheelchairs > 0);

    let mut runs = Vec::new();
    for vehicle in pool {
        if remaining_pickups == 0 && remaining_dropoffs == 0 {
            break;
        }

        let effective = (vehicle.seats as f64 * config.vehicle_capacity_buffer).floor() as u32;
        if effective == 0 {
            continue;
        }

        let pickups = remaining_pickups.min(effective);
        let dropoffs = remaining_dropoffs.min(effective - pickups);
        let wheelchairs = remaining_wheelchairs.min(vehicle.wheelchair_capacity);
        if pickups == 0 && dropoffs == 0 {
            continue;
        }

        remaining_pickups -= pickups;
        remaining_dropoffs -= dropoffs;
        remaining_wheelchairs -= wheelchairs;

        runs.push(VehicleRun { vehicle: vehicle.id, pickups, dropoffs, wheelchairs });
    }

    if remaining_pickups > 0 || remaining_dropoffs > 0 || remaining_wheelchairs > 0 {
        warn!(
            occurrence = %occurrence.id,
            unmet_pickups = remaining_pickups,
            unmet_dropoffs = remaining_dropoffs,
            unmet_wheelchairs = remaining_wheelchairs,
            "vehicle pool exhausted with demand remaining"
        );
    }

    Ok(TransportOutcome {
        runs,
        unmet_pickups: remaining_pickups,
        unmet_dropoffs: remaining_dropoffs,
        unmet_wheelchairs: remaining_wheelchairs,
    })
}

/// Rank ascending by same-day usage then descending seats; with wheelchair
/// demand, wheelchair capacity descends first.  Vehicle ID pins a total
/// order for determinism.
fn rank(pool: &mut [Vehicle], wheelchair_demand: bool) {
    if wheelchair_demand {
        pool.sort_by_key(|v| {
            (std::cmp::Reverse(v.wheelchair_capacity), v.runs_today, std::cmp::Reverse(v.seats), v.id)
        });
    } else {
        pool.sort_by_key(|v| (v.runs_today, std::cmp::Reverse(v.seats), v.id));
    }
}
