//! Type-safe identifier wrappers.
//!
//! Jets and threats are both numbered from 1 in the order they are
//! created, so a bare integer is ambiguous. The newtypes here prevent a
//! threat id from being passed where a jet id is expected. Both serialize
//! transparently as plain JSON numbers to keep the wire format flat.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Generates a newtype wrapper around `u32` with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[serde(transparent)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub u32);

        impl $name {
            /// Create an identifier from its numeric value.
            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            /// Return the inner numeric value.
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
            fn from(value: u32) -> Self {
                Self(value)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Identifier of a friendly jet in the squadron.
    JetId
}

define_id! {
    /// Identifier of an adversarial threat emitter.
    ThreatId
}
