//! The netlist data model (C4, §3).
//!
//! Cross-references between cells and nets form a cyclic graph (§9): a cell
//! port references a net, and the net's driver/users reference cell ports
//! back. Rather than raw pointers we use `(arena, handle)` pairs —
//! [`CellHandle`]/[`NetHandle`] indexing into [`Netlist::cells`]/
//! [`Netlist::nets`].

use std::collections::HashMap;

use pnr_arch::BelId;
use pnr_common::{Delay, Id};
use serde::{Deserialize, Serialize};

use crate::arena::Arena;
use crate::ids::{CellHandle, NetHandle};

/// Binding strength (§3). Ordered; a `bind*` call may only overwrite a
/// strictly lower strength, never an equal one.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Strength {
    /// No binding.
    None,
    /// A provisional binding the packer or an early placement pass may
    /// freely evict.
    Weak,
    /// A binding the heuristic placer's seeding phase will not casually
    /// evict (reserved for future strategies; unused by Phase A/B directly,
    /// which bind at `Placer`).
    Strong,
    /// Bound by the heuristic placer (C8).
    Placer,
    /// Bound by an explicit user constraint (C7). The strongest strength;
    /// nothing in this engine ever overwrites a `User` binding.
    User,
}

/// Which direction data flows through a cell port.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum PortDirection {
    /// An input to the cell.
    In,
    /// An output from the cell.
    Out,
    /// A bidirectional port (e.g. an I/O buffer pad).
    InOut,
}

/// A reference to one endpoint of a net: `(cell, port)` plus a timing budget.
///
/// `cell` is `None` for the synthetic "undriven" driver of a net with no
/// driving cell yet.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct PortRef {
    /// The cell owning this port, if any.
    pub cell: Option<CellHandle>,
    /// The port's name on `cell`.
    pub port: Id,
    /// The timing budget at this endpoint (C9). Writable by the out-of-scope
    /// timing analyser; the budget hook (§4.7) only ever initialises it.
    pub budget: Delay,
}

impl PortRef {
    /// A `PortRef` with no cell — the default driver of an undriven net.
    pub fn undriven(port: Id) -> Self {
        Self {
            cell: None,
            port,
            budget: Delay::UNCONSTRAINED,
        }
    }
}

/// A cell port's local view of the net it connects to, if any.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct PortInfo {
    /// The port's name.
    pub name: Id,
    /// The net this port connects to, if wired up.
    pub net: Option<NetHandle>,
    /// The port's direction.
    pub direction: PortDirection,
}

/// How a bound wire is currently driven.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct WireBinding {
    /// The pip driving this wire, or `None` if it is driven directly by a bel
    /// pin.
    pub pip: Option<pnr_arch::PipId>,
    /// The strength of this wire's binding to the net.
    pub strength: Strength,
}

/// A net: one driver, any number of users, plus the set of wires currently
/// carrying it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Net {
    /// The net's unique name.
    pub name: Id,
    /// The driving port, if any (`cell == None` means undriven).
    pub driver: PortRef,
    /// The sink ports, in declaration order (preserved, never reordered).
    pub users: Vec<PortRef>,
    /// Free-form attributes.
    pub attrs: HashMap<Id, Vec<u8>>,
    /// Free-form parameters.
    pub params: HashMap<Id, Vec<u8>>,
    /// The wires currently carrying this net, keyed by wire handle.
    pub wires: HashMap<pnr_arch::WireId, WireBinding>,
}

impl Net {
    /// Creates a new, undriven net with no users and no bound wires.
    pub fn new(name: Id, driver_port: Id) -> Self {
        Self {
            name,
            driver: PortRef::undriven(driver_port),
            users: Vec::new(),
            attrs: HashMap::new(),
            params: HashMap::new(),
            wires: HashMap::new(),
        }
    }
}

/// A cell: one technology-mapped instance, with an optional placement.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Cell {
    /// The cell's unique name.
    pub name: Id,
    /// The cell's type (e.g. `"LUT"`, `"DFF"`), resolved against the
    /// architecture catalog during placement.
    pub cell_type: Id,
    /// The cell's ports, keyed by port name.
    pub ports: HashMap<Id, PortInfo>,
    /// Free-form attributes. The placer writes `attrs["BEL"]` as a
    /// back-annotation (§6.3); constraints are read from the same map.
    pub attrs: HashMap<Id, Vec<u8>>,
    /// Free-form parameters.
    pub params: HashMap<Id, Vec<u8>>,
    /// The bel this cell is bound to, if placed.
    pub bel: Option<BelId>,
    /// The strength at which `bel` is bound.
    pub bel_strength: Strength,
    /// An optional remap of logical port names to physical bel pin names.
    pub pins: HashMap<Id, Id>,
}

impl Cell {
    /// Creates a new, unplaced cell with no ports.
    pub fn new(name: Id, cell_type: Id) -> Self {
        Self {
            name,
            cell_type,
            ports: HashMap::new(),
            attrs: HashMap::new(),
            params: HashMap::new(),
            bel: None,
            bel_strength: Strength::None,
            pins: HashMap::new(),
        }
    }

    /// Adds a port to the cell.
    pub fn add_port(&mut self, name: Id, direction: PortDirection) {
        self.ports.insert(
            name,
            PortInfo {
                name,
                net: None,
                direction,
            },
        );
    }

    /// `true` if the cell is bound to a bel.
    pub fn is_placed(&self) -> bool {
        self.bel.is_some()
    }
}

/// The netlist: all cells and nets in one design, each reachable by name.
///
/// A dense, insertion-ordered
/// [`Arena`] per entity kind, paired with a `name -> handle` index. The
/// spec's "`cells`, `nets` maps keyed by `Id`" (§3) is realised as that name
/// index rather than as the storage itself, because a bare hash map would not
/// preserve the insertion order §5 requires for deterministic iteration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Netlist {
    /// All cells, in insertion order.
    pub cells: Arena<CellHandle, Cell>,
    /// All nets, in insertion order.
    pub nets: Arena<NetHandle, Net>,
    /// Name index over `cells`. Rebuilt by [`Self::rebuild_indices`] after
    /// deserialization.
    #[serde(skip)]
    pub cell_by_name: HashMap<Id, CellHandle>,
    /// Name index over `nets`. Rebuilt by [`Self::rebuild_indices`] after
    /// deserialization.
    #[serde(skip)]
    pub net_by_name: HashMap<Id, NetHandle>,
}

impl Netlist {
    /// Creates an empty netlist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a cell, indexing it by name. The caller must ensure `cell.name`
    /// is unique within the design (I1).
    pub fn add_cell(&mut self, cell: Cell) -> CellHandle {
        let name = cell.name;
        let handle = self.cells.alloc(cell);
        self.cell_by_name.insert(name, handle);
        handle
    }

    /// Adds a net, indexing it by name. The caller must ensure `net.name` is
    /// unique within the design.
    pub fn add_net(&mut self, net: Net) -> NetHandle {
        let name = net.name;
        let handle = self.nets.alloc(net);
        self.net_by_name.insert(name, handle);
        handle
    }

    /// Looks up a cell handle by name.
    pub fn cell_by_name(&self, name: Id) -> Option<CellHandle> {
        self.cell_by_name.get(&name).copied()
    }

    /// Looks up a net handle by name.
    pub fn net_by_name(&self, name: Id) -> Option<NetHandle> {
        self.net_by_name.get(&name).copied()
    }

    /// Rebuilds the name indices after deserialization.
    pub fn rebuild_indices(&mut self) {
        self.cell_by_name.clear();
        for (handle, cell) in self.cells.iter() {
            self.cell_by_name.insert(cell.name, handle);
        }
        self.net_by_name.clear();
        for (handle, net) in self.nets.iter() {
            self.net_by_name.insert(net.name, handle);
        }
    }

    /// `true` if every cell has a bel assigned.
    pub fn is_fully_placed(&self) -> bool {
        self.cells.values().all(Cell::is_placed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pnr_common::Interner;

    #[test]
    fn add_cell_indexes_by_name() {
        let mut interner = Interner::new();
        let mut netlist = Netlist::new();
        let name = interner.intern("my_lut");
        let cell_type = interner.intern("LUT");
        let handle = netlist.add_cell(Cell::new(name, cell_type));
        assert_eq!(netlist.cell_by_name(name), Some(handle));
        assert_eq!(netlist.cells[handle].name, name);
    }

    #[test]
    fn undriven_net_has_no_driver_cell() {
        let mut interner = Interner::new();
        let name = interner.intern("n1");
        let port = interner.intern("O");
        let net = Net::new(name, port);
        assert!(net.driver.cell.is_none());
        assert!(net.users.is_empty());
    }

    #[test]
    fn new_cell_is_unplaced() {
        let mut interner = Interner::new();
        let name = interner.intern("c0");
        let cell_type = interner.intern("LUT");
        let cell = Cell::new(name, cell_type);
        assert!(!cell.is_placed());
        assert_eq!(cell.bel_strength, Strength::None);
    }

    #[test]
    fn strength_ordering() {
        assert!(Strength::None < Strength::Weak);
        assert!(Strength::Weak < Strength::Strong);
        assert!(Strength::Strong < Strength::Placer);
        assert!(Strength::Placer < Strength::User);
    }

    #[test]
    fn rebuild_indices_restores_lookup_after_clearing() {
        let mut interner = Interner::new();
        let mut netlist = Netlist::new();
        let name = interner.intern("c0");
        let cell_type = interner.intern("LUT");
        netlist.add_cell(Cell::new(name, cell_type));
        netlist.cell_by_name.clear();
        assert_eq!(netlist.cell_by_name(name), None);
        netlist.rebuild_indices();
        assert!(netlist.cell_by_name(name).is_some());
    }

    #[test]
    fn is_fully_placed_reflects_bel_assignment() {
        let mut interner = Interner::new();
        let mut netlist = Netlist::new();
        let name = interner.intern("c0");
        let cell_type = interner.intern("LUT");
        let handle = netlist.add_cell(Cell::new(name, cell_type));
        assert!(!netlist.is_fully_placed());
        netlist.cells[handle].bel = Some(BelId::from_raw(0));
        assert!(netlist.is_fully_placed());
    }
}
