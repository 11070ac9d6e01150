//! Interned identifiers for design entities (C1).
//!
//! `Id` is a dense `u32` index into a context-local string table. Index `0` is
//! reserved for the null identifier (`Id::default()`) — the interner pins it
//! to the empty string at construction so that no real name is ever assigned
//! that slot, the same trick the reference placer this engine is modeled on
//! uses for its own null `IdString`.

use lasso::Rodeo;
use serde::{Deserialize, Serialize};

use crate::result::CoreError;

/// An interned identifier: a `u32` index into a single [`Interner`]'s string
/// table.
///
/// `Id`s from different interners are not comparable — there is exactly one
/// active interner per design [`Context`](../pnr_place/struct.Context.html).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Id(u32);

impl Id {
    /// The null identifier (index 0).
    pub const NULL: Id = Id(0);

    /// Creates an `Id` from a raw index, bypassing the interner.
    ///
    /// Intended for deserialization and for re-deriving an `Id` from an index
    /// already known to have been issued by the corresponding [`Interner`].
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index backing this identifier.
    pub fn as_raw(self) -> u32 {
        self.0
    }

    /// Returns `true` if this is the null identifier.
    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Debug for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Id({})", self.0)
    }
}

// SAFETY: `Id` wraps a `u32`, which always fits in a `usize` on the platforms
// this crate targets, and `try_from_usize` rejects values that would not
// round-trip.
unsafe impl lasso::Key for Id {
    fn into_usize(self) -> usize {
        self.0 as usize
    }

    fn try_from_usize(int: usize) -> Option<Self> {
        u32::try_from(int).ok().map(Id)
    }
}

/// The context-local string interner.
///
/// Single-writer by design (§5 forbids concurrent mutation): callers external
/// to the owning `Context` must not intern strings directly. Backed by
/// [`lasso::Rodeo`], which provides a `string -> index` map plus an
/// append-only `index -> &string` table without duplicating string storage.
pub struct Interner {
    rodeo: Rodeo<Id>,
}

impl Interner {
    /// Creates a new interner with index 0 reserved for the null identifier.
    pub fn new() -> Self {
        let mut rodeo = Rodeo::new();
        let null = rodeo.get_or_intern("");
        debug_assert_eq!(null.as_raw(), 0, "slot 0 must be reserved for the null id");
        Self { rodeo }
    }

    /// Interns `s`, returning its existing `Id` or appending a new one.
    ///
    /// O(1) amortised, per §4.1.
    pub fn intern(&mut self, s: &str) -> Id {
        self.rodeo.get_or_intern(s)
    }

    /// Resolves `id` back to its string.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this interner. `Id`s from different
    /// interners are never comparable (§9); callers must not cross them.
    pub fn str(&self, id: Id) -> &str {
        self.rodeo.resolve(&id)
    }

    /// Looks up the `Id` for `s` without interning it.
    pub fn get(&self, s: &str) -> Option<Id> {
        self.rodeo.get(s)
    }

    /// Bulk pre-registers `s` at `expected_idx`, for verifying architecture
    /// built-in tables against runtime numbering.
    ///
    /// Fails if `s` is already interned, or if `expected_idx` is not the
    /// next free slot.
    pub fn initialize_add(&mut self, s: &str, expected_idx: u32) -> Result<Id, CoreError> {
        if self.rodeo.get(s).is_some() {
            return Err(CoreError::new(format!(
                "initializeAdd: {s:?} is already interned"
            )));
        }
        let next = self.rodeo.len() as u32;
        if next != expected_idx {
            return Err(CoreError::new(format!(
                "initializeAdd: expected index {expected_idx} for {s:?}, next free slot is {next}"
            )));
        }
        Ok(self.rodeo.get_or_intern(s))
    }

    /// Returns the number of interned strings, including the reserved null
    /// slot.
    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    /// Returns `true` if only the reserved null slot is interned.
    pub fn is_empty(&self) -> bool {
        self.rodeo.len() <= 1
    }

    /// Returns every interned string in index order, including the reserved
    /// null slot at index 0 (the empty string).
    ///
    /// Paired with [`Self::from_ordered_strings`] so a CLI or file format can
    /// persist a design's whole string table between pipeline stages without
    /// this crate needing to derive `serde` for the interner itself: `Id`
    /// values are stable as long as the strings are re-interned in the same
    /// order they were recorded in.
    pub fn strings(&self) -> Vec<&str> {
        (0..self.rodeo.len() as u32)
            .map(|i| self.rodeo.resolve(&Id(i)))
            .collect()
    }

    /// Rebuilds an interner from a string table previously produced by
    /// [`Self::strings`], re-interning each entry in order so the resulting
    /// `Id` values match the original exactly.
    ///
    /// `strings[0]` is expected to be the empty string (the reserved null
    /// slot); it is skipped since [`Self::new`] already reserves it.
    pub fn from_ordered_strings(strings: &[String]) -> Self {
        let mut interner = Self::new();
        for s in strings.iter().skip(1) {
            interner.intern(s);
        }
        interner
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_is_reserved() {
        let interner = Interner::new();
        assert_eq!(Id::NULL.as_raw(), 0);
        assert!(Id::default().is_null());
        assert_eq!(interner.str(Id::NULL), "");
    }

    #[test]
    fn intern_resolve_roundtrip() {
        let mut interner = Interner::new();
        let id = interner.intern("clk");
        assert_eq!(interner.str(id), "clk");
    }

    #[test]
    fn same_string_same_id() {
        let mut interner = Interner::new();
        let a = interner.intern("LUT4");
        let b = interner.intern("LUT4");
        assert_eq!(a, b);
    }

    #[test]
    fn different_strings_different_ids() {
        let mut interner = Interner::new();
        let a = interner.intern("foo");
        let b = interner.intern("bar");
        assert_ne!(a, b);
    }

    #[test]
    fn ids_never_reuse_null_slot() {
        let mut interner = Interner::new();
        let a = interner.intern("first");
        assert_ne!(a, Id::NULL);
        assert_eq!(a.as_raw(), 1);
    }

    #[test]
    fn get_without_interning() {
        let mut interner = Interner::new();
        assert_eq!(interner.get("missing"), None);
        let id = interner.intern("present");
        assert_eq!(interner.get("present"), Some(id));
    }

    #[test]
    fn initialize_add_matches_next_slot() {
        let mut interner = Interner::new();
        let id = interner.initialize_add("LUT4", 1).unwrap();
        assert_eq!(id.as_raw(), 1);
        assert_eq!(interner.str(id), "LUT4");
    }

    #[test]
    fn initialize_add_rejects_wrong_index() {
        let mut interner = Interner::new();
        let err = interner.initialize_add("LUT4", 5).unwrap_err();
        assert!(err.message.contains("expected index 5"));
    }

    #[test]
    fn initialize_add_rejects_duplicate() {
        let mut interner = Interner::new();
        interner.initialize_add("LUT4", 1).unwrap();
        let err = interner.initialize_add("LUT4", 2).unwrap_err();
        assert!(err.message.contains("already interned"));
    }

    #[test]
    fn initialize_add_then_intern_agrees() {
        let mut interner = Interner::new();
        let fixed = interner.initialize_add("DFF", 1).unwrap();
        let looked_up = interner.intern("DFF");
        assert_eq!(fixed, looked_up);
    }

    #[test]
    fn len_and_is_empty() {
        let mut interner = Interner::new();
        assert!(interner.is_empty());
        interner.intern("a");
        assert!(!interner.is_empty());
        assert_eq!(interner.len(), 2); // null slot + "a"
    }

    #[test]
    fn serde_roundtrip() {
        let mut interner = Interner::new();
        let id = interner.intern("serde_test");
        let json = serde_json::to_string(&id).unwrap();
        let restored: Id = serde_json::from_str(&json).unwrap();
        assert_eq!(id, restored);
        assert_eq!(interner.str(restored), "serde_test");
    }

    #[test]
    fn id_ordering_is_by_index() {
        let mut interner = Interner::new();
        let a = interner.intern("a");
        let b = interner.intern("b");
        assert!(a < b);
    }

    #[test]
    fn debug_format() {
        let mut interner = Interner::new();
        let id = interner.intern("x");
        assert_eq!(format!("{id:?}"), "Id(1)");
    }
}
