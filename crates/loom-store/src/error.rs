//! Error type for loom-store.

use thiserror::Error;

/// Errors raised while opening or seeding the store.
///
/// The engine-facing trait impls don't use this directly — they map
/// `rusqlite` errors into the error types the contracts demand
/// (`EngineError::Store`, `StaffingError::Directory`, …).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Alias for `Result<T, StoreError>`.
pub type StoreResult<T> = Result<T, StoreError>;
