//! Fallback stop sequencing.
//!
//! When no external directions service is available, transport cards still
//! want a sensible stop order.  This module provides a nearest-neighbor
//! ordering over great-circle distance: start at the venue, repeatedly hop
//! to the closest unvisited stop, and close the loop back at the venue.
//!
//! This is an explicit heuristic, not a TSP solver — no backtracking, no
//! 2-opt improvement.  For the handful of stops a single vehicle serves the
//! result is close enough, and it is deterministic.

use loom_core::{GeoPoint, ParticipantId};

/// What a stop is: the venue acting as depot, or one participant's address.
#[derive(Copy, Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum StopKind {
    Venue,
    Participant(ParticipantId),
}

/// One stop on a transport leg.
#[derive(Copy, Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Stop {
    pub kind: StopKind,
    pub coord: GeoPoint,
}

impl Stop {
    pub fn venue(coord: GeoPoint) -> Self {
        Stop { kind: StopKind::Venue, coord }
    }

    pub fn participant(id: ParticipantId, coord: GeoPoint) -> Self {
        Stop { kind: StopKind::Participant(id), coord }
    }
}

/// Order `stops` by nearest-neighbor from the venue, appending the venue
/// again as the closing stop.
///
/// With no venue stop present the input is returned unmodified — a degraded
/// outcome, not an error.  Exactly one venue is expected; if several appear,
/// the first acts as depot and the rest are visited like ordinary stops.
pub fn sequence_stops(stops: Vec<Stop>) -> Vec<Stop> {
    let Some(depot_idx) = stops.iter().position(|s| s.kind == StopKind::Venue) else {
        return stops;
    };

    let mut unvisited = stops;
    let depot = unvisited.remove(depot_idx);

    let mut ordered = Vec::with_capacity(unvisited.len() + 2);
    ordered.push(depot);

    let mut current = depot.coord;
    while !unvisited.is_empty() {
        let (nearest_idx, _) = unvisited
            .iter()
            .enumerate()
            .map(|(i, s)| (i, current.distance_km(s.coord)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap(); // non-empty by the loop condition
        let next = unvisited.remove(nearest_idx);
        current = next.coord;
        ordered.push(next);
    }

    ordered.push(depot);
    ordered
}
