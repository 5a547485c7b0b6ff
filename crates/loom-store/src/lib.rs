//! `loom-store` — SQLite persistence for the loom engine.
//!
//! Implements the three contracts the engine consumes — `StaffDirectory`,
//! `VehicleDirectory`, and `EngineStore` — on top of a single `rusqlite`
//! connection, plus seeding helpers for the tables the engine only reads.
//!
//! | Module          | Contents                                           |
//! |-----------------|----------------------------------------------------|
//! | [`store`]       | `SqliteStore`, connection setup, seeding           |
//! | `directories`   | staff/vehicle directory queries                    |
//! | `engine`        | `EngineStore` reads and transactional writes       |
//! | `schema`        | table definitions                                  |
//! | [`error`]       | `StoreError`, `StoreResult<T>`                     |

pub mod error;
pub mod store;

mod directories;
mod engine;
mod schema;

#[cfg(test)]
mod tests;

pub use error::{StoreError, StoreResult};
pub use store::SqliteStore;
