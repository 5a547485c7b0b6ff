//! `loom-engine` — the resource allocation and schedule derivation engine.
//!
//! Given a scheduled program occurrence and its confirmed participants, the
//! engine computes staff and vehicle assignments, derives transport and
//! roster cards, computes the occurrence's financial outcome, and persists
//! everything through the [`EngineStore`] contract in one transaction.
//!
//! # Crate layout
//!
//! | Module         | Contents                                               |
//! |----------------|--------------------------------------------------------|
//! | [`processor`]  | `process_occurrence`, `ProcessOutcome`, warnings       |
//! | [`exceptions`] | `cancel_participant`, `record_staff_absence`           |
//! | [`rebalance`]  | `rebalance_day`, `RebalanceReport`                     |
//! | [`store`]      | `EngineStore` trait, `DerivedState`, `StaffShift`      |
//! | [`audit`]      | `AuditEntry`                                           |
//! | [`error`]      | `EngineError`, `EngineResult<T>`                       |
//!
//! # Entry points
//!
//! ```rust,ignore
//! let outcome = loom_engine::process_occurrence(&mut store, occurrence_id)?;
//! let report  = loom_engine::rebalance_day(&mut store, date)?;
//! let result  = loom_engine::cancel_participant(&mut store, participant, date, "sick")?;
//! ```

pub mod audit;
pub mod error;
pub mod exceptions;
pub mod processor;
pub mod rebalance;
pub mod store;


pub use audit::AuditEntry;
pub use error::{EngineError, EngineResult};
pub use exceptions::{cancel_participant, record_staff_absence, ExceptionOutcome};
pub use processor::{process_occurrence, ProcessOutcome, ProcessWarnings};
pub use rebalance::{rebalance_day, RebalanceReport};
pub use store::{DerivedState, EngineStore, StaffShift};
