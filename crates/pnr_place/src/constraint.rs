//! The constraint placer (C7, §4.5).
//!
//! Honours `attrs["BEL"]` user pins ahead of the heuristic placer. Every cell
//! successfully bound here carries `Strength::User`, which nothing later in
//! the engine may overwrite (§3's strength ordering).

use pnr_arch::ArchCatalog;

use crate::context::Context;
use crate::error::PlacerError;
use crate::ids::CellHandle;
use crate::model::Strength;

/// Resolves and binds every `attrs["BEL"]`-constrained cell in `ctx.netlist`.
///
/// This is one of the three operations exposed at the core boundary (§6.4,
/// `placeConstraints(ctx)`). Returns `Ok(true)` if every constraint bound
/// cleanly, `Ok(false)` if `ctx.force` downgraded at least one failure to a
/// warning, and `Err` for a fatal (non-downgradable, or `force`-disabled)
/// failure.
pub fn place_constraints<A: ArchCatalog>(ctx: &mut Context<A>) -> Result<bool, PlacerError> {
    let Some(bel_key) = ctx.interner.get("BEL") else {
        // No cell in this design ever had a `BEL` attribute interned, so none
        // can carry a constraint.
        return Ok(true);
    };

    let candidates: Vec<CellHandle> = ctx
        .netlist
        .cells
        .iter()
        .filter(|(_, cell)| cell.attrs.contains_key(&bel_key))
        .map(|(handle, _)| handle)
        .collect();

    let mut all_ok = true;
    for handle in candidates {
        if let Err(err) = bind_one_constraint(ctx, handle, bel_key) {
            ctx.downgrade_or_fail(err)?;
            all_ok = false;
        }
    }
    Ok(all_ok)
}

fn bind_one_constraint<A: ArchCatalog>(
    ctx: &mut Context<A>,
    handle: CellHandle,
    bel_key: pnr_common::Id,
) -> Result<(), PlacerError> {
    let cell = &ctx.netlist.cells[handle];
    let cell_name = ctx.interner.str(cell.name).to_string();
    let bel_name_bytes = cell.attrs.get(&bel_key).expect("filtered for presence above");
    let bel_name = String::from_utf8_lossy(bel_name_bytes).into_owned();
    let cell_type = cell.cell_type;

    let Some(bel) = ctx.catalog.get_bel_by_name(&bel_name) else {
        return Err(PlacerError::UnknownBel { cell_name, bel_name });
    };

    let bel_type = ctx.catalog.bel_type(bel);
    if bel_type != cell_type {
        return Err(PlacerError::TypeMismatch {
            cell_name,
            cell_type: ctx.interner.str(cell_type).to_string(),
            bel_name,
            bel_type: ctx.interner.str(bel_type).to_string(),
        });
    }

    ctx.binding.bind_bel(&mut ctx.netlist, bel, handle, Strength::User)?;
    ctx.progress(format!("constraint: {cell_name} -> {bel_name}"));
    Ok(())
}
