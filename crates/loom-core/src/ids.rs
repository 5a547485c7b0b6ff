//! Strongly typed identifier wrappers for the domain entities.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  The inner integer is `pub` because
//! the store layer binds it directly into SQL parameters.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[derive(serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        $vis struct $name(pub $inner);

        impl $name {
            #[inline(always)]
            pub fn raw(self) -> $inner {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$inner> for $name {
            #[inline(always)]
            fn from(raw: $inner) -> $name {
                $name(raw)
            }
        }
    };
}

typed_id! {
    /// A recurring program (the template occurrences are scheduled from).
    pub struct ProgramId(u32);
}

typed_id! {
    /// One dated, timed run of a program.
    pub struct OccurrenceId(u32);
}

typed_id! {
    /// A participant in the provider's directory.
    pub struct ParticipantId(u32);
}

typed_id! {
    /// A staff member in the provider's directory.
    pub struct StaffId(u32);
}

typed_id! {
    /// A vehicle in the provider's fleet.
    pub struct VehicleId(u32);
}
