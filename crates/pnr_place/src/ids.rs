//! Dense handles for cells and nets stored in a [`crate::model::Netlist`].
//!
//! `cells`/`nets` are conceptually maps keyed by the entity's `Id` (interned
//! name). We implement that as a name-indexed [`Arena`] instead of a literal
//! `HashMap<Id, Cell>`: a `Vec`-backed arena gives insertion-order iteration
//! for free (required by §5's determinism guarantee), which a bare hash map
//! would not, while [`crate::model::Netlist::cell_by_name`] / `net_by_name`
//! supply the name lookup.

use serde::{Deserialize, Serialize};

use crate::arena::ArenaId;

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates a handle from a raw arena index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw arena index backing this handle.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl ArenaId for $name {
            fn from_raw(index: u32) -> Self {
                Self(index)
            }
            fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

define_handle!(
    /// Dense handle for a [`crate::model::Cell`] in the netlist arena.
    CellHandle
);

define_handle!(
    /// Dense handle for a [`crate::model::Net`] in the netlist arena.
    NetHandle
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let h = CellHandle::from_raw(4);
        assert_eq!(h.as_raw(), 4);
    }

    #[test]
    fn distinct_handle_types_do_not_mix() {
        // Compile-time property: CellHandle and NetHandle are distinct types,
        // so a CellHandle can never be passed where a NetHandle is expected.
        let c = CellHandle::from_raw(0);
        let n = NetHandle::from_raw(0);
        assert_eq!(c.as_raw(), n.as_raw());
    }
}
