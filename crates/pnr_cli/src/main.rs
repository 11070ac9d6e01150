//! `pnr` — CLI wrapper around the placement core (§6.4's command surface).
//!
//! A clap-derive `Cli`/`Command` pair with global flags, dispatching to one
//! `run` per subcommand; `pnr.toml` is read first and CLI flags override
//! whatever the file set.
//!
//! Only the three operations named in §6.4 are exposed: `place-constraints`,
//! `place-heuristic`, `check`. `place-heuristic` runs the constraint placer
//! first (constraints must legalise before the heuristic placer runs, same
//! order `place_heuristic`'s own callers use in `pnr_place`'s tests) and then
//! the timing-budget hook, since a placed design with no budgets assigned is
//! not a useful hand-off to the out-of-scope router/timing analyser.

mod config;
mod design_file;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use pnr_arch::{GridCatalog, GridConfig};
use pnr_common::{Interner, Severity};
use pnr_place::{assign_budgets, place_constraints, place_heuristic, Context};

use config::{load_config, PnrConfig};

/// A CLI for the core placement engine: constraint legalisation and the
/// two-phase heuristic placer, operating on a JSON design file against a
/// synthetic rectangular-grid reference device.
#[derive(Parser)]
#[command(name = "pnr", version, about = "FPGA core placement engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory to read `pnr.toml` from. Defaults to the current directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit progress notes in addition to warnings/errors.
    #[arg(long, global = true)]
    verbose: bool,

    /// Continue past downgradable errors instead of aborting (§7).
    #[arg(long, global = true)]
    force: bool,

    /// The PRNG seed (§5). Overrides `pnr.toml`'s `placement.seed`.
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Target clock frequency, in Hz, for the budget-assignment hook (C9).
    #[arg(long, global = true)]
    target_freq_hz: Option<f64>,

    /// Named device preset, overriding `pnr.toml`'s `[device]` table.
    #[arg(long, global = true, value_enum)]
    device: Option<DevicePreset>,
}

/// Built-in `GridCatalog` sizes, selectable by name instead of spelling out a
/// full `[device]` table.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum DevicePreset {
    /// A 4x4 grid, 2 LUTs and 2 FFs per tile — matches `pnr_place`'s own test
    /// fixtures.
    Small,
    /// `GridConfig::default()`'s 8x8 grid.
    Default,
    /// A 32x32 grid with two PLL tiles, for exercising larger designs.
    Large,
}

impl DevicePreset {
    fn into_grid_config(self) -> GridConfig {
        match self {
            DevicePreset::Small => GridConfig {
                width: 4,
                height: 4,
                luts_per_tile: 2,
                ffs_per_tile: 2,
                bram_column_stride: 2,
                dsp_column_stride: 4,
                pll_tiles: vec![(0, 0)],
                clock_region_size: 2,
                max_clocks_per_region: 1,
            },
            DevicePreset::Default => GridConfig::default(),
            DevicePreset::Large => GridConfig {
                width: 32,
                height: 32,
                luts_per_tile: 8,
                ffs_per_tile: 8,
                bram_column_stride: 4,
                dsp_column_stride: 8,
                pll_tiles: vec![(0, 0), (16, 16)],
                clock_region_size: 8,
                max_clocks_per_region: 2,
            },
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Run the constraint placer (C7) over a design's `BEL` attributes.
    PlaceConstraints(NetlistArgs),
    /// Run constraint placement, the two-phase heuristic placer (C8), and the
    /// budget-assignment hook (C9), in that order.
    PlaceHeuristic(NetlistArgs),
    /// Run the integrity checker (C6) and report any invariant violation.
    Check(NetlistArgs),
}

impl Command {
    fn args(&self) -> &NetlistArgs {
        match self {
            Command::PlaceConstraints(a) | Command::PlaceHeuristic(a) | Command::Check(a) => a,
        }
    }
}

#[derive(clap::Args)]
struct NetlistArgs {
    /// Path to the input design, as previously written by `pnr` or by the
    /// (out-of-scope) netlist parser.
    netlist: PathBuf,

    /// Where to write the resulting design. Defaults to overwriting the
    /// input. Ignored by `check`, which never mutates its input.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn resolve_device(cli_device: Option<DevicePreset>, config: &PnrConfig) -> GridConfig {
    match cli_device {
        Some(preset) => preset.into_grid_config(),
        None => config.device.clone().unwrap_or_default(),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let project_dir = cli.config.clone().unwrap_or_else(|| PathBuf::from("."));

    let config = match load_config(&project_dir) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let verbose = cli.verbose || config.placement.verbose;
    let force = cli.force || config.placement.force;
    let seed = cli.seed.unwrap_or(config.placement.seed);
    let target_freq_hz = cli.target_freq_hz.or(config.placement.target_freq_hz);
    let device = resolve_device(cli.device, &config);

    let args = cli.command.args();

    let mut interner = Interner::new();
    let catalog = GridCatalog::new(&mut interner, device);
    let netlist = match design_file::load_into(&args.netlist, &mut interner) {
        Ok(netlist) => netlist,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut ctx = Context::new(interner, catalog, seed)
        .with_force(force)
        .with_verbose(verbose);
    ctx.netlist = netlist;

    let result = run(&cli.command, &mut ctx, target_freq_hz);

    for note in ctx.diagnostics.notes() {
        let tag = match note.severity {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        eprintln!("{tag}: {}", note.message);
    }

    if let Err(err) = result {
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }

    if !matches!(cli.command, Command::Check(_)) {
        let out_path = args.out.clone().unwrap_or_else(|| args.netlist.clone());
        if let Err(err) = design_file::save(&out_path, &ctx.interner, &ctx.netlist) {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}

fn run(
    command: &Command,
    ctx: &mut Context<GridCatalog>,
    target_freq_hz: Option<f64>,
) -> Result<(), pnr_place::PlacerError> {
    match command {
        Command::PlaceConstraints(_) => place_constraints(ctx).map(|_| ()),
        Command::PlaceHeuristic(_) => {
            place_constraints(ctx)?;
            place_heuristic(ctx)?;
            assign_budgets(ctx, target_freq_hz);
            Ok(())
        }
        Command::Check(_) => ctx.check(),
    }
}
