//! Core error type.
//!
//! Sub-crates define their own error enums and either convert `CoreError`
//! via `From` or keep it as one variant — whichever keeps error sites clean.

use thiserror::Error;

/// The base error type for `loom-core`.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `loom-core`.
pub type CoreResult<T> = Result<T, CoreError>;
