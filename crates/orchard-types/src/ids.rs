//! Type-safe identifier wrappers around `u32`.
//!
//! Every entity in the simulation has a strongly-typed ID to prevent
//! accidental mixing of identifiers at compile time. IDs are assigned
//! sequentially by the engine at construction, so a seeded run always
//! produces the same IDs.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around `u32` with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            /// Create an identifier from its raw index.
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            /// Return the inner index.
            pub const fn into_inner(self) -> u32 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(raw: u32) -> Self {
                Self(raw)
            }
        }
    };
}

define_id! {
    /// Unique identifier for a bug agent.
    BugId
}

define_id! {
    /// Unique identifier for a fruit hanging on a tree.
    FruitId
}

define_id! {
    /// Unique identifier for a tree in the orchard.
    TreeId
}

define_id! {
    /// Unique identifier for a deployed pesticide dispersal unit.
    PesticideId
}

define_id! {
    /// Unique identifier for a climate sensor.
    SensorId
}
