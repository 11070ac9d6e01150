//! The timing-budget assignment hook (C9, §4.7).
//!
//! Initialises every net's sink budgets from a target frequency, then lets
//! the architecture catalog clamp per-net exceptions (e.g. a known-slow
//! asynchronous reset path). Nothing downstream of this hook is implemented
//! here — an actual timing analyser that tightens these budgets against
//! estimated path delay is out of scope (§1's Non-goals).

use pnr_arch::ArchCatalog;
use pnr_common::Delay;

use crate::context::Context;
use crate::model::PortRef;

/// Assigns an initial timing budget to every sink in `ctx.netlist` (§4.7).
///
/// `target_freq_hz` becomes `1 / f` on every sink, or
/// [`Delay::UNCONSTRAINED`] if `None`. The per-net clock (the clock driving
/// the net's own driver cell, if any) is then passed to
/// [`ArchCatalog::get_budget_override`] so the catalog can clamp specific
/// nets (e.g. relax a known-asynchronous path) before the value is written
/// back. This is one of the three operations exposed at the core boundary
/// (§6.4, `assignBudgets(ctx, targetFreqHz)`).
pub fn assign_budgets<A: ArchCatalog>(ctx: &mut Context<A>, target_freq_hz: Option<f64>) {
    let base = match target_freq_hz {
        Some(hz) if hz > 0.0 => Delay::from_frequency_hz(hz),
        _ => Delay::UNCONSTRAINED,
    };

    let net_handles: Vec<_> = ctx.netlist.nets.iter().map(|(handle, _)| handle).collect();
    for handle in net_handles {
        let net_clock = driving_clock(ctx, handle);
        let budget = ctx.catalog.get_budget_override(net_clock, base);

        let net = &mut ctx.netlist.nets[handle];
        net.driver.budget = budget;
        for user in &mut net.users {
            user.budget = budget;
        }
    }
    ctx.progress(format!(
        "assigned budgets for {} net(s) at {}",
        ctx.netlist.nets.len(),
        match target_freq_hz {
            Some(hz) => format!("{hz} Hz"),
            None => "no target frequency".to_string(),
        }
    ));
}

/// The clock net driving `net`'s own driver cell, if its driver port is
/// itself a clock-derived output (e.g. a `DFF`'s `Q` output tracks the
/// `DFF`'s own clock). `None` for combinational nets or undriven nets.
fn driving_clock<A: ArchCatalog>(ctx: &Context<A>, handle: crate::ids::NetHandle) -> Option<pnr_common::Id> {
    let net = &ctx.netlist.nets[handle];
    let PortRef { cell: Some(driver_cell), port, .. } = net.driver else {
        return None;
    };
    let cell_type = ctx.netlist.cells[driver_cell].cell_type;
    ctx.catalog.get_port_clock(cell_type, port)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cell, Net};
    use pnr_arch::{GridCatalog, GridConfig};
    use pnr_common::Interner;

    fn fresh_context() -> Context<GridCatalog> {
        let mut interner = Interner::new();
        let catalog = GridCatalog::new(&mut interner, GridConfig::default());
        Context::new(interner, catalog, 3)
    }

    fn add_net(ctx: &mut Context<GridCatalog>, name: &str) -> crate::ids::NetHandle {
        let net_name = ctx.interner.intern(name);
        let (_in_pin, out_pin, _clk) = ctx.catalog.pin_names();
        ctx.netlist.add_net(Net::new(net_name, out_pin))
    }

    #[test]
    fn no_target_frequency_yields_unconstrained_budget() {
        let mut ctx = fresh_context();
        let handle = add_net(&mut ctx, "n0");
        assign_budgets(&mut ctx, None);
        assert_eq!(ctx.netlist.nets[handle].driver.budget, Delay::UNCONSTRAINED);
    }

    #[test]
    fn target_frequency_becomes_period_budget() {
        let mut ctx = fresh_context();
        let handle = add_net(&mut ctx, "n0");
        assign_budgets(&mut ctx, Some(100.0e6));
        assert_eq!(ctx.netlist.nets[handle].driver.budget, Delay::from_frequency_hz(100.0e6));
    }

    #[test]
    fn budget_propagates_to_every_user() {
        let mut ctx = fresh_context();
        let handle = add_net(&mut ctx, "n0");
        let (in_pin, _out_pin, _clk) = ctx.catalog.pin_names();
        ctx.netlist.nets[handle].users.push(PortRef {
            cell: None,
            port: in_pin,
            budget: Delay::ZERO,
        });
        ctx.netlist.nets[handle].users.push(PortRef {
            cell: None,
            port: in_pin,
            budget: Delay::ZERO,
        });
        assign_budgets(&mut ctx, Some(200.0e6));
        let expected = Delay::from_frequency_hz(200.0e6);
        for user in &ctx.netlist.nets[handle].users {
            assert_eq!(user.budget, expected);
        }
    }

    #[test]
    fn zero_or_negative_frequency_falls_back_to_unconstrained() {
        let mut ctx = fresh_context();
        let handle = add_net(&mut ctx, "n0");
        assign_budgets(&mut ctx, Some(0.0));
        assert_eq!(ctx.netlist.nets[handle].driver.budget, Delay::UNCONSTRAINED);
    }

    #[test]
    fn dff_driven_net_reports_its_clock_to_the_catalog() {
        let mut ctx = fresh_context();
        let dff = ctx.catalog.cell_types().dff;
        let (_in_pin, out_pin, clk_pin) = ctx.catalog.pin_names();
        let cell_name = ctx.interner.intern("ff0");
        let mut cell = Cell::new(cell_name, dff);
        cell.add_port(clk_pin, crate::model::PortDirection::In);
        cell.add_port(out_pin, crate::model::PortDirection::Out);
        let cell_handle = ctx.netlist.add_cell(cell);

        let net_name = ctx.interner.intern("q0");
        let mut net = Net::new(net_name, out_pin);
        net.driver.cell = Some(cell_handle);
        let net_handle = ctx.netlist.add_net(net);

        let clock = driving_clock(&ctx, net_handle);
        assert_eq!(clock, Some(clk_pin));
    }

    #[test]
    fn running_twice_is_idempotent() {
        let mut ctx = fresh_context();
        let handle = add_net(&mut ctx, "n0");
        assign_budgets(&mut ctx, Some(50.0e6));
        let first = ctx.netlist.nets[handle].driver.budget;
        assign_budgets(&mut ctx, Some(50.0e6));
        let second = ctx.netlist.nets[handle].driver.budget;
        assert_eq!(first, second);
    }
}
