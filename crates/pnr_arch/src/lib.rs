//! The architecture catalog interface (C3) and opaque device handles (§3).
//!
//! This crate is the placement core's only window onto a concrete FPGA
//! device: it defines the [`ArchCatalog`] trait that any real device database
//! would implement, and ships one synthetic reference implementation,
//! [`GridCatalog`], used by the test suite and the CLI demo in place of the
//! out-of-scope per-architecture device database (§1).

#![warn(missing_docs)]

pub mod catalog;
pub mod grid;
pub mod ids;

pub use catalog::ArchCatalog;
pub use grid::{CellTypeIds, GridCatalog, GridConfig};
pub use ids::{BelId, DecalId, GroupId, PipId, WireId};
