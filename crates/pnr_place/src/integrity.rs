//! The integrity checker and checksum (C6).
//!
//! `check` asserts invariants I1–I5 (§3) and fails fast with
//! [`PlacerError::InvariantFailure`] on the first violation found, naming the
//! offending entity. `checksum` produces the deterministic digest described
//! in §4.4: a tree of per-entity digests, each entity's contribution mixed
//! with [`pnr_common::mix32`], maps reduced by sum (order-independent) and
//! sequences folded in declared order (order-sensitive).

use pnr_arch::ArchCatalog;
use pnr_common::mix32;

use crate::binding::BindingStore;
use crate::error::PlacerError;
use crate::ids::CellHandle;
use crate::model::{Netlist, PortDirection, Strength};

fn strength_code(strength: Strength) -> u32 {
    match strength {
        Strength::None => 0,
        Strength::Weak => 1,
        Strength::Strong => 2,
        Strength::Placer => 3,
        Strength::User => 4,
    }
}

const NO_CELL: u32 = u32::MAX;

fn attr_checksum(map: &std::collections::HashMap<pnr_common::Id, Vec<u8>>) -> u32 {
    map.iter().fold(0u32, |acc, (key, value)| {
        let mut h = mix32(key.as_raw());
        h = mix32(h ^ pnr_common::fold_bytes(value));
        acc.wrapping_add(h)
    })
}

/// Asserts invariants I1–I5 over `netlist`'s current state against `binding`
/// and `catalog`. Returns the first violation found.
pub fn check<A: ArchCatalog>(
    netlist: &Netlist,
    binding: &BindingStore,
    catalog: &A,
) -> Result<(), PlacerError> {
    // I1: a placed cell's bel must point back to that same cell.
    for (handle, cell) in netlist.cells.iter() {
        if let Some(bel) = cell.bel {
            if binding.bel_cell(bel) != Some(handle) {
                return Err(PlacerError::InvariantFailure {
                    invariant: "I1",
                    detail: format!(
                        "cell {} claims bel {} but the binding store disagrees",
                        cell.name.as_raw(),
                        bel.as_raw()
                    ),
                });
            }
        }
    }

    // I2: every wire a net claims must be bound back to that net, and if it
    // carries a pip, the pip must both drive that wire and be bound to the
    // same net.
    for (handle, net) in netlist.nets.iter() {
        for (&wire, entry) in net.wires.iter() {
            if binding.wire_net(wire) != Some(handle) {
                return Err(PlacerError::InvariantFailure {
                    invariant: "I2",
                    detail: format!(
                        "wire {} is listed under net {} but the binding store disagrees",
                        wire.as_raw(),
                        net.name.as_raw()
                    ),
                });
            }
            if let Some(pip) = entry.pip {
                if catalog.pip_dst(pip) != wire {
                    return Err(PlacerError::InvariantFailure {
                        invariant: "I2",
                        detail: format!("pip {} does not drive wire {}", pip.as_raw(), wire.as_raw()),
                    });
                }
                if binding.pip_net(pip) != Some(handle) {
                    return Err(PlacerError::InvariantFailure {
                        invariant: "I2",
                        detail: format!("pip {} is not bound to net {}", pip.as_raw(), net.name.as_raw()),
                    });
                }
            }
        }
    }

    // I3: every bound wire belongs to the net it claims to.
    for (wire, net) in binding.wire_bindings() {
        let owns_wire = (net.as_raw() as usize) < netlist.nets.len() && netlist.nets[net].wires.contains_key(&wire);
        if !owns_wire {
            return Err(PlacerError::InvariantFailure {
                invariant: "I3",
                detail: format!("wire {} is bound but absent from its net's wire map", wire.as_raw()),
            });
        }
    }

    // I4: a linked OUT port must be exactly the net's driver; a linked IN
    // port must appear exactly once among the net's users.
    for (cell_handle, cell) in netlist.cells.iter() {
        for port in cell.ports.values() {
            let Some(net_handle) = port.net else {
                continue;
            };
            let net = &netlist.nets[net_handle];
            match port.direction {
                PortDirection::Out => {
                    if net.driver.cell != Some(cell_handle) || net.driver.port != port.name {
                        return Err(PlacerError::InvariantFailure {
                            invariant: "I4",
                            detail: format!(
                                "cell {} port {} is an OUT link to net {} but is not its driver",
                                cell.name.as_raw(),
                                port.name.as_raw(),
                                net.name.as_raw()
                            ),
                        });
                    }
                }
                PortDirection::In => {
                    let occurrences = net
                        .users
                        .iter()
                        .filter(|user| user.cell == Some(cell_handle) && user.port == port.name)
                        .count();
                    if occurrences != 1 {
                        return Err(PlacerError::InvariantFailure {
                            invariant: "I4",
                            detail: format!(
                                "cell {} port {} appears {occurrences} times among net {}'s users (expected 1)",
                                cell.name.as_raw(),
                                port.name.as_raw(),
                                net.name.as_raw()
                            ),
                        });
                    }
                }
                PortDirection::InOut => {}
            }
        }
    }

    // I5: every bound handle must have been issued by this catalog. Catalogs
    // issue dense `0..len` indices, so a bounds check is a sound proxy for
    // "issued by the current catalog" without needing a catalog identity tag.
    for (bel, _) in binding.bel_bindings() {
        if (bel.as_raw() as usize) >= catalog.bels().len() {
            return Err(PlacerError::InvariantFailure {
                invariant: "I5",
                detail: format!("bel {} is bound but unknown to the catalog", bel.as_raw()),
            });
        }
    }
    for (wire, _) in binding.wire_bindings() {
        if (wire.as_raw() as usize) >= catalog.wires().len() {
            return Err(PlacerError::InvariantFailure {
                invariant: "I5",
                detail: format!("wire {} is bound but unknown to the catalog", wire.as_raw()),
            });
        }
    }
    for (pip, _) in binding.pip_bindings() {
        if (pip.as_raw() as usize) >= catalog.pips().len() {
            return Err(PlacerError::InvariantFailure {
                invariant: "I5",
                detail: format!("pip {} is bound but unknown to the catalog", pip.as_raw()),
            });
        }
    }

    Ok(())
}

fn cell_checksum<A: ArchCatalog>(cell: &crate::model::Cell, catalog: &A) -> u32 {
    let mut h = mix32(cell.name.as_raw());
    h = mix32(h ^ cell.cell_type.as_raw());
    if let Some(bel) = cell.bel {
        h = mix32(h ^ catalog.bel_checksum(bel) ^ strength_code(cell.bel_strength));
    }
    let port_sum = cell.ports.values().fold(0u32, |acc, port| {
        let mut p = mix32(port.name.as_raw());
        let net_code = port.net.map(|net| net.as_raw()).unwrap_or(NO_CELL);
        p = mix32(p ^ net_code);
        acc.wrapping_add(p)
    });
    h = mix32(h ^ port_sum);
    h = mix32(h ^ attr_checksum(&cell.attrs));
    h = mix32(h ^ attr_checksum(&cell.params));
    h
}

fn net_checksum<A: ArchCatalog>(net: &crate::model::Net, catalog: &A) -> u32 {
    let mut h = mix32(net.name.as_raw());
    let driver_code = net.driver.cell.map(CellHandle::as_raw).unwrap_or(NO_CELL);
    h = mix32(h ^ driver_code);
    h = mix32(h ^ net.driver.port.as_raw());
    h = mix32(h ^ net.driver.budget.as_picos() as u32);

    // `users` is declared-order sensitive (§4.4), so fold sequentially
    // instead of summing.
    let mut chain = 0u32;
    for user in &net.users {
        let user_code = user.cell.map(CellHandle::as_raw).unwrap_or(NO_CELL);
        chain = mix32(chain ^ user_code);
        chain = mix32(chain ^ user.port.as_raw());
    }
    h = mix32(h ^ chain);

    // `wires` is a map, so reduce by sum for order independence.
    let wire_sum = net.wires.iter().fold(0u32, |acc, (&wire, entry)| {
        let mut w = mix32(catalog.wire_checksum(wire));
        if let Some(pip) = entry.pip {
            w = mix32(w ^ catalog.pip_checksum(pip));
        }
        w = mix32(w ^ strength_code(entry.strength));
        acc.wrapping_add(w)
    });
    h = mix32(h ^ wire_sum);

    h = mix32(h ^ attr_checksum(&net.attrs));
    h = mix32(h ^ attr_checksum(&net.params));
    h
}

/// Produces the deterministic digest over the netlist and all bindings
/// (§4.4), stable under reordering of hash-mapped containers.
pub fn checksum<A: ArchCatalog>(netlist: &Netlist, catalog: &A) -> u32 {
    let mut total = 0u32;
    for (_, cell) in netlist.cells.iter() {
        total = total.wrapping_add(cell_checksum(cell, catalog));
    }
    for (_, net) in netlist.nets.iter() {
        total = total.wrapping_add(net_checksum(net, catalog));
    }
    mix32(total)
}
