//! Error type for loom-transport.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    /// The vehicle directory could not be queried (store/transport failure).
    #[error("vehicle directory error: {0}")]
    Directory(String),
}

pub type TransportResult<T> = Result<T, TransportError>;
