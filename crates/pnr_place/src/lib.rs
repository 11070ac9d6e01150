//! The placement core (C4–C9): netlist model, binding store, integrity
//! checker, constraint placer, heuristic placer, and timing-budget hook.
//!
//! Sits above `pnr_arch` (the architecture catalog boundary) and `pnr_common`
//! (interning and delay algebra), a foundation-crate-below-IR/placer layering
//! common to FPGA toolchain workspaces.

#![warn(missing_docs)]

pub mod arena;
pub mod binding;
pub mod budget;
pub mod constraint;
pub mod context;
pub mod error;
pub mod heuristic;
pub mod ids;
pub mod integrity;
pub mod model;

pub use binding::BindingStore;
pub use budget::assign_budgets;
pub use constraint::place_constraints;
pub use context::Context;
pub use error::PlacerError;
pub use heuristic::{place_design, place_heuristic};
pub use ids::{CellHandle, NetHandle};
pub use model::{Cell, Net, Netlist, PortDirection, PortInfo, PortRef, Strength, WireBinding};
