//! `pnr.toml` project configuration.
//!
//! A `serde`-derived struct plus a thin `load_config`/`load_config_from_str`
//! pair, with parsing kept separate from the caller so a malformed-but-
//! syntactically-valid file produces a specific, labeled error instead of a
//! confusing downstream panic.

use std::fs;
use std::path::Path;

use pnr_arch::GridConfig;
use serde::Deserialize;
use thiserror::Error;

/// Everything `pnr.toml` may configure. Every field is optional so an absent
/// file (or an absent table within one) falls back to the built-in defaults;
/// CLI flags layer on top of whatever this produces (§6.4's override order).
#[derive(Debug, Default, Deserialize)]
pub struct PnrConfig {
    /// The `[placement]` table.
    #[serde(default)]
    pub placement: PlacementConfig,
    /// The `[device]` table, the grid parameters for the built-in reference
    /// catalog.
    pub device: Option<GridConfig>,
}

/// The four flags named in §6.4: `verbose`, `force`, `seed`, and an optional
/// target frequency.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Emit progress notes in addition to warnings/errors.
    pub verbose: bool,
    /// Continue past downgradable errors instead of aborting.
    pub force: bool,
    /// The PRNG seed (§5).
    pub seed: u64,
    /// Target clock frequency, in Hz, for the budget-assignment hook (C9).
    pub target_freq_hz: Option<f64>,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            force: false,
            seed: 1,
            target_freq_hz: None,
        }
    }
}

/// An error loading or validating `pnr.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The path that could not be read.
        path: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// The file's contents did not parse as valid TOML matching the schema.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// The path that failed to parse.
        path: String,
        /// The underlying TOML error.
        #[source]
        source: toml::de::Error,
    },
}

/// Loads `pnr.toml` from `project_dir`, or returns the default config if no
/// such file exists there.
pub fn load_config(project_dir: &Path) -> Result<PnrConfig, ConfigError> {
    let path = project_dir.join("pnr.toml");
    if !path.exists() {
        return Ok(PnrConfig::default());
    }
    let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_config_from_str(&content, &path.display().to_string())
}

/// Parses `content` as a `pnr.toml` document. `path` is used only to label
/// errors.
pub fn load_config_from_str(content: &str, path: &str) -> Result<PnrConfig, ConfigError> {
    toml::from_str(content).map_err(|source| ConfigError::Parse {
        path: path.to_string(),
        source,
    })
}
