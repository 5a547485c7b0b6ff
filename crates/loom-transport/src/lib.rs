//! `loom-transport` — vehicle assignment and fallback stop sequencing.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                 |
//! |--------------|----------------------------------------------------------|
//! | [`vehicles`] | `VehicleDirectory` trait, `assign_vehicles`, `VehicleRun`|
//! | [`route`]    | `Stop`, `StopKind`, `sequence_stops` (nearest-neighbor)  |
//! | [`error`]    | `TransportError`, `TransportResult<T>`                   |
//!
//! Unmet pickup/dropoff/wheelchair demand is returned as counts on
//! [`TransportOutcome`], never as errors.

pub mod error;
pub mod route;
pub mod vehicles;


pub use error::{TransportError, TransportResult};
pub use route::{sequence_stops, Stop, StopKind};
pub use vehicles::{assign_vehicles, TransportOutcome, VehicleDirectory, VehicleRun};
