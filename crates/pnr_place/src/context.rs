//! The design context (§3): owns the interner, netlist, binding store, and
//! architecture catalog for one P&R invocation, plus the flags named in
//! §6.4 (`verbose`, `force`, `seed`, target frequency is passed per-call to
//! [`crate::budget::assign_budgets`] rather than stored here, since it is a
//! one-shot hook input, not standing context state).
//!
//! Generic over `A: ArchCatalog` rather than `dyn ArchCatalog`, per §9's
//! "monomorphised call sites where the target language allows" — there is
//! exactly one catalog implementation per `Context`, fixed for its lifetime.

use pnr_arch::ArchCatalog;
use pnr_common::{DiagnosticSink, Interner};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::binding::BindingStore;
use crate::error::PlacerError;
use crate::integrity;
use crate::model::Netlist;

/// Owns every piece of per-design state the placer touches (§3's "Context").
pub struct Context<A: ArchCatalog> {
    /// The context-local string interner (C1).
    pub interner: Interner,
    /// The netlist being placed (C4).
    pub netlist: Netlist,
    /// The bel/wire/pip binding store (C5).
    pub binding: BindingStore,
    /// The architecture catalog (C3), fixed for the context's lifetime.
    pub catalog: A,
    /// The PRNG seed (§5). No current phase draws from it; it exists for
    /// future strategies, per §9's open question.
    pub seed: u64,
    /// Continue past downgradable errors (§7) instead of aborting.
    pub force: bool,
    /// Emit `Severity::Info` progress notes in addition to warnings/errors.
    pub verbose: bool,
    /// Accumulated progress and diagnostic notes.
    pub diagnostics: DiagnosticSink,
}

impl<A: ArchCatalog> Context<A> {
    /// Creates a new context over `interner` and `catalog`, with no cells or
    /// nets yet loaded.
    pub fn new(interner: Interner, catalog: A, seed: u64) -> Self {
        Self {
            interner,
            netlist: Netlist::new(),
            binding: BindingStore::new(),
            catalog,
            seed,
            force: false,
            verbose: false,
            diagnostics: DiagnosticSink::new(),
        }
    }

    /// Enables `force` (continue past downgradable errors).
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Enables `verbose` progress notes.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// The context's seeded PRNG (§5). No Phase A/B strategy draws from it
    /// today; it is here so a future strategy can without changing the
    /// context's shape.
    pub fn rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.seed)
    }

    /// Runs the integrity checker (C6), asserting invariants I1–I5.
    ///
    /// This is one of the three operations exposed at the core boundary
    /// (§6.4, `check(ctx)`).
    pub fn check(&self) -> Result<(), PlacerError> {
        integrity::check(&self.netlist, &self.binding, &self.catalog)
    }

    /// Computes the deterministic checksum (C6) over the current netlist and
    /// bindings.
    pub fn checksum(&self) -> u32 {
        integrity::checksum(&self.netlist, &self.catalog)
    }

    /// Reports `err` through `self.diagnostics`, downgrading it to a warning
    /// and returning `Ok(())` if `self.force` is set and the error kind is
    /// downgradable (§7); otherwise records it as an error and returns it.
    pub(crate) fn downgrade_or_fail(&self, err: PlacerError) -> Result<(), PlacerError> {
        if self.force && err.is_downgradable() {
            self.diagnostics.warn(err.to_string());
            Ok(())
        } else {
            self.diagnostics.error(err.to_string());
            Err(err)
        }
    }

    /// Emits a progress note if `self.verbose` is set.
    pub(crate) fn progress(&self, message: impl Into<String>) {
        if self.verbose {
            self.diagnostics.info(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pnr_arch::{GridCatalog, GridConfig};

    fn fresh_context() -> Context<GridCatalog> {
        let mut interner = Interner::new();
        let catalog = GridCatalog::new(&mut interner, GridConfig::default());
        Context::new(interner, catalog, 42)
    }

    #[test]
    fn new_context_has_empty_netlist() {
        let ctx = fresh_context();
        assert!(ctx.netlist.cells.is_empty());
        assert!(ctx.netlist.nets.is_empty());
    }

    #[test]
    fn check_passes_on_empty_design() {
        let ctx = fresh_context();
        assert!(ctx.check().is_ok());
    }

    #[test]
    fn checksum_is_deterministic() {
        let ctx = fresh_context();
        assert_eq!(ctx.checksum(), ctx.checksum());
    }

    #[test]
    fn builder_flags_apply() {
        let ctx = fresh_context().with_force(true).with_verbose(true);
        assert!(ctx.force);
        assert!(ctx.verbose);
    }

    #[test]
    fn rng_is_seed_stable() {
        use rand::RngCore;
        let ctx = fresh_context();
        let mut a = ctx.rng();
        let mut b = ctx.rng();
        assert_eq!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn downgrade_or_fail_without_force_propagates() {
        let ctx = fresh_context();
        let err = PlacerError::ResourceExhausted {
            cell_type: "LUT".into(),
            available: 0,
        };
        assert!(ctx.downgrade_or_fail(err).is_err());
    }

    #[test]
    fn downgrade_or_fail_with_force_swallows_downgradable() {
        let ctx = fresh_context().with_force(true);
        let err = PlacerError::ResourceExhausted {
            cell_type: "LUT".into(),
            available: 0,
        };
        assert!(ctx.downgrade_or_fail(err).is_ok());
        assert!(ctx.diagnostics.notes().iter().any(|n| n.severity == pnr_common::Severity::Warning));
    }

    #[test]
    fn downgrade_or_fail_never_swallows_invariant_failure() {
        let ctx = fresh_context().with_force(true);
        let err = PlacerError::InvariantFailure {
            invariant: "I2",
            detail: "forged".into(),
        };
        assert!(ctx.downgrade_or_fail(err).is_err());
    }
}
