//! Engine error type.
//!
//! Resource shortfalls are deliberately absent here — they are data on the
//! outcome types, not errors.  What can fail a processing pass is the store:
//! a query that cannot run, or a transaction that cannot commit.

use loom_core::OccurrenceId;
use loom_staffing::StaffingError;
use loom_transport::TransportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Staffing(#[from] StaffingError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A store read or non-persist mutation failed.
    #[error("store error: {0}")]
    Store(String),

    #[error("occurrence {0} not found")]
    OccurrenceNotFound(OccurrenceId),

    /// The persistence transaction could not commit; everything was rolled
    /// back and the occurrence's prior derived state is untouched.
    #[error("failed to persist occurrence {occurrence}: {cause}")]
    Persist { occurrence: OccurrenceId, cause: String },
}

pub type EngineResult<T> = Result<T, EngineError>;
