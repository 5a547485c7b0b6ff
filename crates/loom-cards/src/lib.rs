//! `loom-cards` — derivation of UI-facing scheduling cards.
//!
//! # Crate layout
//!
//! | Module       | Contents                                       |
//! |--------------|------------------------------------------------|
//! | [`card`]     | `Card`, `CardKind`, natural-key semantics      |
//! | [`generate`] | `generate_cards` (pure derivation)             |
//!
//! Card generation is a total, deterministic function of its inputs — the
//! persistence layer relies on that to make reprocessing idempotent.

pub mod card;
pub mod generate;


pub use card::{Card, CardKind};
pub use generate::generate_cards;
