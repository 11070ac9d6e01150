//! The architecture catalog interface (C3).
//!
//! `ArchCatalog` is the boundary between the placement core and the
//! per-architecture device database, which is treated as an external
//! collaborator (§1) — this crate owns only the trait and one reference
//! implementation ([`crate::grid::GridCatalog`]) that stands in for a real
//! device database in tests and the CLI demo.
//!
//! Methods split into two groups: those the placer actually calls every
//! hot-loop iteration
//! (required, no default), and those that exist to complete the interface for
//! out-of-scope consumers (the router, the timing analyser, a GUI) but that
//! the placement core itself never calls — these carry default stub bodies so
//! a minimal catalog implementation compiles without extra boilerplate.
//!
//! `checkBelAvail`/`checkWireAvail`/`checkPipAvail` from §4.2's method list are
//! deliberately **not** on this trait: per §6.1, "every method is pure with
//! respect to catalog state", but availability also depends on live binding
//! state, which the catalog never sees. That composite check lives on the
//! binding store (C5, in `pnr_place`) instead, which calls
//! [`ArchCatalog::exclusive_bels`] for the architecture-defined half of the
//! rule (e.g. two stacked BRAM18 bels sharing one physical BRAM36).

use pnr_common::{Delay, DelayInfo, Id};

use crate::ids::{BelId, DecalId, GroupId, PipId, WireId};

/// The required, pure interface to a device's programmable fabric.
///
/// An implementation is fixed for the lifetime of the owning
/// [`Context`](../pnr_place/struct.Context.html) (§9, "variants are selected
/// at context construction"). Nothing here mutates; all state belongs to the
/// binding store.
pub trait ArchCatalog: std::fmt::Debug {
    // --- Bels (required; the placer's hot path) ---

    /// All bels in the catalog, in declaration order. Phase A's single cursor
    /// (§4.6) walks this sequence exactly once per cell type.
    fn bels(&self) -> &[BelId];

    /// The bels physically located at grid position `(x, y)`.
    fn bels_by_tile(&self, x: i32, y: i32) -> Vec<BelId>;

    /// The declared type of `bel`, as an interned identifier (so the catalog
    /// need not know the placer's `Id` has any particular meaning beyond
    /// equality).
    fn bel_type(&self, bel: BelId) -> Id;

    /// The bel's declared instance name, used for `attrs["BEL"]`
    /// back-annotation (§6.3).
    fn bel_name(&self, bel: BelId) -> &str;

    /// Resolves a bel by its declared name, for the constraint placer (§4.5)
    /// and for re-resolving a back-annotated `attrs["BEL"]`.
    fn get_bel_by_name(&self, name: &str) -> Option<BelId>;

    /// The bel's integer grid coordinates `(x, y, z)`; `z` disambiguates
    /// multiple bels at the same `(x, y)`.
    fn bel_location(&self, bel: BelId) -> (i32, i32, i32);

    /// The floating-point centre of the bel, used when a cost function wants
    /// sub-tile resolution. The placer's own HPWL cost (§4.6) uses the
    /// integer `bel_location` instead; this exists for other consumers.
    fn estimate_position(&self, bel: BelId) -> (f64, f64);

    /// The bel's named pins, in declaration order.
    fn bel_pins(&self, bel: BelId) -> &[Id];

    /// The wire a given pin of `bel` connects to, if any.
    fn bel_pin_wire(&self, bel: BelId, pin: Id) -> Option<WireId>;

    /// `true` if `bel` is a global buffer (clock distribution) bel.
    fn bel_global_buf(&self, bel: BelId) -> bool;

    /// `true` if `bel`'s location is legal in isolation (distinct from
    /// resource-sharing exclusion, which the binding store checks via
    /// [`Self::exclusive_bels`]).
    fn is_bel_location_valid(&self, bel: BelId) -> bool;

    /// Other bels that become unavailable once `bel` is bound (e.g. a
    /// stacked/shared physical resource). Empty for the common case of no
    /// sharing. The binding store combines this with live binding state to
    /// answer `checkBelAvail` (§4.3).
    fn exclusive_bels(&self, bel: BelId) -> &[BelId];

    /// The sole architecture-level design-rule check the placer consults
    /// (§4.2). Must be deterministic and side-effect-free; it is handed the
    /// cell's type and the set of clock nets already bound in `bel`'s region
    /// (computed by the caller via [`Self::bel_region`] and
    /// [`Self::is_clock_port`], so the catalog never has to depend on the
    /// placer's cell or net types) so that it can enforce resource limits
    /// (e.g. "at most one distinct clock per region").
    fn is_valid_bel_for_cell(&self, cell_type: Id, bel: BelId, clocks_in_region: &[Id]) -> bool;

    /// An opaque grouping key for the resource-sharing region `bel` belongs
    /// to (e.g. a clock region). Two bels in the same region share resource
    /// limits such as "at most one distinct clock". The key's internal
    /// structure is catalog-defined; callers only ever compare it for
    /// equality. Default: every bel shares one global region (no limiting).
    fn bel_region(&self, _bel: BelId) -> u64 {
        0
    }

    // --- Wires and pips (required) ---

    /// All wires in the catalog.
    fn wires(&self) -> &[WireId];

    /// All pips in the catalog.
    fn pips(&self) -> &[PipId];

    /// The wire a pip reads from.
    fn pip_src(&self, pip: PipId) -> WireId;

    /// The wire a pip drives.
    fn pip_dst(&self, pip: PipId) -> WireId;

    /// Pips that can drive `wire`.
    fn pips_uphill(&self, wire: WireId) -> Vec<PipId>;

    /// Pips that `wire` can drive.
    fn pips_downhill(&self, wire: WireId) -> Vec<PipId>;

    // --- Per-object checksums (required, feeds C6) ---

    /// Deterministic digest of a bel's identity, mixed into the checksum
    /// tree (C6) wherever a binding references this bel.
    fn bel_checksum(&self, bel: BelId) -> u32;

    /// Deterministic digest of a wire's identity.
    fn wire_checksum(&self, wire: WireId) -> u32;

    /// Deterministic digest of a pip's identity.
    fn pip_checksum(&self, pip: PipId) -> u32;

    // --- Timing and routing estimation (defaulted; consumed by the
    //     out-of-scope router/timing analyser, never by this placer) ---

    /// Delay along a wire segment. Default zero.
    fn wire_delay(&self, _wire: WireId) -> Delay {
        Delay::ZERO
    }

    /// Delay through a pip. Default zero.
    fn pip_delay(&self, _pip: PipId) -> Delay {
        Delay::ZERO
    }

    /// A low upper bound on delay between two wires for an otherwise-unused
    /// chip, used by the timing analyser to seed optimistic estimates.
    /// Default zero.
    fn estimate_delay(&self, _src: WireId, _dst: WireId) -> Delay {
        Delay::ZERO
    }

    /// A delay prediction for a given net/sink pair, expressed in terms of
    /// bel and pin identity to avoid a dependency on the placer's own net and
    /// port types. Default zero.
    fn predict_delay(&self, _src_bel: BelId, _src_pin: Id, _dst_bel: BelId, _dst_pin: Id) -> Delay {
        Delay::ZERO
    }

    /// A small delay added to break ties between otherwise-equal routing
    /// options. Default zero.
    fn get_delay_epsilon(&self) -> Delay {
        Delay::ZERO
    }

    /// Penalty applied to a pip's delay each time it is ripped up, used by the
    /// (out-of-scope) router's negotiated-congestion loop. Default zero.
    fn get_ripup_delay_penalty(&self) -> Delay {
        Delay::ZERO
    }

    /// The combinational or sequential delay for a cell's internal timing arc
    /// from `from_pin` to `to_pin`, if one exists. Default `None`.
    fn get_cell_delay(&self, _cell_type: Id, _from_pin: Id, _to_pin: Id) -> Option<DelayInfo> {
        None
    }

    /// The clock port driving the given port of a cell type, if any. Default
    /// `None`.
    fn get_port_clock(&self, _cell_type: Id, _port: Id) -> Option<Id> {
        None
    }

    /// `true` if `port` on `cell_type` is itself a clock input. Default
    /// `false`.
    fn is_clock_port(&self, _cell_type: Id, _port: Id) -> bool {
        false
    }

    /// Clamps a sink's timing budget (§4.7). The default passes `budget`
    /// through unchanged.
    fn get_budget_override(&self, _net_clock: Option<Id>, budget: Delay) -> Delay {
        budget
    }

    // --- Groups and decals (defaulted; GUI/snapshot consumers only) ---

    /// All bel groups in the catalog (e.g. clock regions). Default empty.
    fn groups(&self) -> &[GroupId] {
        &[]
    }

    /// The bels belonging to `group`. Default empty.
    fn group_bels(&self, _group: GroupId) -> &[BelId] {
        &[]
    }

    /// The graphical decal attached to `bel`, if any. Default `None`.
    fn decal_for_bel(&self, _bel: BelId) -> Option<DecalId> {
        None
    }
}
