//! `loom-core` — foundational types for the loom allocation engine.
//!
//! This crate is a dependency of every other `loom-*` crate.  It
//! intentionally has no `loom-*` dependencies and a minimal external
//! footprint (`thiserror`, `serde`/`serde_json`, `tracing`).
//!
//! # What lives here
//!
//! | Module     | Contents                                                  |
//! |------------|-----------------------------------------------------------|
//! | [`ids`]    | `ProgramId`, `OccurrenceId`, `ParticipantId`, `StaffId`, `VehicleId` |
//! | [`time`]   | `Date`, `ClockTime`, `TimeWindow`                         |
//! | [`geo`]    | `GeoPoint`, haversine distance                            |
//! | [`config`] | `EngineConfig`, `ConfigValue`                             |
//! | [`model`]  | Directory-supplied domain records                         |
//! | [`error`]  | `CoreError`, `CoreResult`                                 |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod model;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{ConfigValue, EngineConfig};
pub use error::{CoreError, CoreResult};
pub use geo::GeoPoint;
pub use ids::{OccurrenceId, ParticipantId, ProgramId, StaffId, VehicleId};
pub use model::{
    AllocationStatus, BillingLine, EmploymentType, Occurrence, OccurrenceSummary,
    ParticipantAllocation, StaffMember, Vehicle,
};
pub use time::{ClockTime, Date, TimeWindow};
