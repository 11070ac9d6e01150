//! Opaque device handles issued by an architecture catalog.
//!
//! Unlike [`pnr_common::Id`], whose null value is slot `0` of an interner,
//! these IDs are catalog-issued indices with no interner backing them, so the
//! null sentinel is `u32::MAX` instead — a real catalog is expected to run out
//! of address space long before issuing that many bels, wires, or pips.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// The distinguished null handle (§3).
            pub const NULL: $name = $name(u32::MAX);

            /// Creates a handle from a raw catalog-issued index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw index backing this handle.
            pub fn as_raw(self) -> u32 {
                self.0
            }

            /// Returns `true` if this is the null handle.
            pub fn is_null(self) -> bool {
                self.0 == u32::MAX
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::NULL
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                if self.is_null() {
                    write!(f, concat!(stringify!($name), "(null)"))
                } else {
                    write!(f, concat!(stringify!($name), "({})"), self.0)
                }
            }
        }
    };
}

define_id!(
    /// Opaque handle for a basic element of logic (a placement target).
    BelId
);

define_id!(
    /// Opaque handle for a routing wire segment.
    WireId
);

define_id!(
    /// Opaque handle for a programmable interconnect point joining two wires.
    PipId
);

define_id!(
    /// Opaque handle for a group of related bels (e.g. a clock region), used
    /// only by read-only snapshot consumers such as a GUI (§5).
    GroupId
);

define_id!(
    /// Opaque handle for a graphical decal attached to a bel, used only by
    /// read-only snapshot consumers such as a GUI (§5).
    DecalId
);
