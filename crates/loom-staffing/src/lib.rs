//! `loom-staffing` — staff requirement calculation and roster assignment.
//!
//! # Crate layout
//!
//! | Module          | Contents                                               |
//! |-----------------|--------------------------------------------------------|
//! | [`requirement`] | `StaffRequirement`, `staff_requirement` (pure)         |
//! | [`assign`]      | `StaffDirectory` trait, `assign_staff`, roster types   |
//! | [`error`]       | `StaffingError`, `StaffingResult<T>`                   |
//!
//! The requirement calculator is pure arithmetic; the assignor is the only
//! part that touches the staff directory.  Shortfalls (not enough qualified
//! staff) are returned as counts on [`StaffingOutcome`], never as errors.

pub mod assign;
pub mod error;
pub mod requirement;


pub use assign::{assign_staff, ShiftRole, StaffAssignment, StaffDirectory, StaffingOutcome};
pub use error::{StaffingError, StaffingResult};
pub use requirement::{staff_requirement, StaffRequirement};
