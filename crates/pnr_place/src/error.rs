//! Placement-domain errors (§7).
//!
//! One per-stage error enum rather than a single crate-wide catch-all: these
//! are *expected* domain failures (a bad user constraint, an over-subscribed
//! resource), not compiler bugs, so each one carries the context a caller
//! needs to report it.

/// An error raised by the constraint placer (C7), heuristic placer (C8), or
/// integrity checker (C6).
#[derive(Debug, thiserror::Error)]
pub enum PlacerError {
    /// A constraint named a bel the catalog does not recognise.
    #[error("unknown bel {bel_name:?} referenced by constraint on cell {cell_name:?}")]
    UnknownBel {
        /// The cell carrying the offending `BEL=` constraint.
        cell_name: String,
        /// The unresolved bel name.
        bel_name: String,
    },

    /// A user constraint named a bel whose type does not match the cell.
    #[error("cell {cell_name:?} of type {cell_type:?} cannot bind bel {bel_name:?} of type {bel_type:?}")]
    TypeMismatch {
        /// The cell carrying the offending constraint.
        cell_name: String,
        /// The cell's declared type name.
        cell_type: String,
        /// The bel named by the constraint.
        bel_name: String,
        /// The bel's actual type name.
        bel_type: String,
    },

    /// A cell's type has no matching bels anywhere in the catalog.
    #[error("cell type {cell_type:?} has no bels in the catalog")]
    UnknownBelType {
        /// The cell type with no catalog bels.
        cell_type: String,
    },

    /// Phase A's single cursor for a cell type ran out of matching bels.
    #[error("resource exhausted: too many cells of type {cell_type:?} (catalog has {available} matching bels)")]
    ResourceExhausted {
        /// The cell type whose supply was exhausted.
        cell_type: String,
        /// The number of matching bels the catalog offered.
        available: usize,
    },

    /// Phase B found no legal bel for a cell after unbinding it.
    #[error("no legal bel found for cell {cell_name:?} during iterative improvement")]
    PlacementFailure {
        /// The cell that could not be re-placed.
        cell_name: String,
    },

    /// A `bindBel`/`bindWire`/`bindPip` call found the resource already bound
    /// at a strength it cannot overwrite. Always fatal — this is a bug in the
    /// caller, never a legitimate user-facing condition.
    #[error("{resource} is already bound at strength >= the requested strength")]
    AlreadyBound {
        /// A human-readable description of the resource (bel/wire/pip name).
        resource: String,
    },

    /// An `unbindBel`/`unbindWire`/`unbindPip` call targeted a resource that
    /// was not bound. Always fatal.
    #[error("{resource} is not bound")]
    NotBound {
        /// A human-readable description of the resource.
        resource: String,
    },

    /// `check()` found an I1–I5 invariant violated. Always fatal.
    #[error("invariant {invariant} violated: {detail}")]
    InvariantFailure {
        /// Which invariant failed (e.g. `"I2"`).
        invariant: &'static str,
        /// A description naming the offending entity.
        detail: String,
    },
}

impl PlacerError {
    /// `true` if `force` (§7) is permitted to downgrade this error to a
    /// logged warning and a `false` return instead of aborting the phase.
    ///
    /// Binding-store and invariant errors are never downgradable — they
    /// indicate a bug in the engine itself, not a condition a user constraint
    /// or resource limit can legitimately trigger.
    pub fn is_downgradable(&self) -> bool {
        !matches!(
            self,
            PlacerError::AlreadyBound { .. }
                | PlacerError::NotBound { .. }
                | PlacerError::InvariantFailure { .. }
        )
    }
}
