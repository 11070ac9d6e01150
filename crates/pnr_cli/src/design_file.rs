//! On-disk JSON representation of a design: the interner's string table plus
//! the netlist, so a design can be written to and read from disk between
//! pipeline invocations (the "Serialization" ambient-stack requirement).
//!
//! [`Interner`] itself intentionally does not derive `serde` (its job is
//! `String -> Id` interning, not persistence), so this module is the single
//! place that knows how to flatten one into an ordered string table and
//! replay it onto a freshly-built interner on load.
//!
//! Loading always replays strings onto an interner that has *already* had a
//! [`pnr_arch::GridCatalog`] built into it (see `main.rs`'s load order): the
//! catalog's own type/pin names claim the first several indices via
//! `initialize_add`, and replaying is idempotent for any name already present
//! (re-interning returns the existing `Id`), so the result only depends on
//! the saved design having been produced against the *same* device
//! configuration. A design saved against one grid size and loaded against a
//! differently-shaped one will not resolve correctly — the CLI always
//! resolves the device from the same `pnr.toml`/`--device` pair for both
//! directions of a pipeline.

use std::fs;
use std::path::Path;

use pnr_common::Interner;
use pnr_place::Netlist;
use serde::{Deserialize, Serialize};

/// A design as written to or read from a `.json` file: the full string
/// table (in index order, including the device catalog's own names)
/// alongside the netlist that references it.
#[derive(Serialize, Deserialize)]
struct DesignFile {
    strings: Vec<String>,
    netlist: Netlist,
}

/// Loads a design from `path`, replaying its string table onto `interner`
/// (expected to already carry a catalog's built-in names) and returning the
/// deserialized netlist with its name indices rebuilt.
pub fn load_into(path: &Path, interner: &mut Interner) -> Result<Netlist, String> {
    let content = fs::read_to_string(path).map_err(|e| format!("reading {}: {e}", path.display()))?;
    let file: DesignFile =
        serde_json::from_str(&content).map_err(|e| format!("parsing {}: {e}", path.display()))?;
    for s in file.strings.iter().skip(1) {
        interner.intern(s);
    }
    let mut netlist = file.netlist;
    netlist.rebuild_indices();
    Ok(netlist)
}

/// Writes `interner`/`netlist` to `path` as a `DesignFile`.
pub fn save(path: &Path, interner: &Interner, netlist: &Netlist) -> Result<(), String> {
    let file = DesignFile {
        strings: interner.strings().iter().map(|s| s.to_string()).collect(),
        netlist: netlist.clone(),
    };
    let content = serde_json::to_string_pretty(&file).map_err(|e| format!("serializing design: {e}"))?;
    fs::write(path, content).map_err(|e| format!("writing {}: {e}", path.display()))
}
