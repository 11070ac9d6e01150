//! Foundational types shared by every crate in the placement engine.
//!
//! This crate owns the two leaf components of the design-state substrate: the
//! string interner (`Id`/`Interner`) and the delay algebra (`Delay`/`DelayInfo`).
//! It has no dependency on the other crates in the workspace, sitting at the
//! bottom of the dependency graph.

#![warn(missing_docs)]

pub mod checksum;
pub mod delay;
pub mod diagnostics;
pub mod ident;
pub mod result;

pub use checksum::{fold_bytes, mix32};
pub use delay::{Delay, DelayInfo};
pub use diagnostics::{DiagnosticSink, Note, Severity};
pub use ident::{Id, Interner};
pub use result::{CoreError, CoreResult};
