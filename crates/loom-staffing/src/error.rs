//! Error type for loom-staffing.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StaffingError {
    /// The staff directory could not be queried (store/transport failure).
    #[error("staff directory error: {0}")]
    Directory(String),
}

pub type StaffingResult<T> = Result<T, StaffingError>;
