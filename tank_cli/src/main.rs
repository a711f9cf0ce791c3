//! # H2 Tank Designer CLI
//!
//! Command-line front end for `tank_core`. Every command prints pretty JSON
//! on stdout; logs and errors go to stderr.
//!
//! ## Exit Codes
//!
//! - `0` - success
//! - `1` - calculation, file or internal error
//! - `2` - invalid input, unknown design/material or bad configuration
//!
//! ## Usage
//!
//! ```text
//! tank_cli designs
//! tank_cli stress type4-700
//! tank_cli reliability type4-700 --samples 10000 --seed 1 --limit 1575
//! tank_cli --config analysis.toml --designs designs.json failure my-tank
//! ```

mod logging;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use tank_core::api::{ReliabilityOptions, ReportContext};
use tank_core::catalog::DesignCatalog;
use tank_core::config::AnalysisConfig;
use tank_core::design::{LoadCase, LoadCaseType};
use tank_core::errors::CalcError;
use tank_core::file_io::{load_catalog, save_design};
use tank_core::materials::{MaterialKind, MaterialRegistry};

#[derive(Parser, Debug)]
#[command(name = "tank_cli")]
#[command(version)]
#[command(about = "Composite hydrogen tank calculations: stress, failure and reliability reports")]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Analysis configuration (TOML); defaults apply when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Design catalog (JSON); the built-in reference designs when omitted
    #[arg(short, long, global = true)]
    designs: Option<PathBuf>,

    /// Extra material catalog (TOML) merged over the standard materials
    #[arg(short, long, global = true)]
    materials: Option<PathBuf>,

    /// Debug logging when RUST_LOG is unset
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the designs in the catalog
    Designs,
    /// List materials
    Materials {
        /// Only this category
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
    },
    /// Per-layer and peak stresses
    Stress {
        id: String,
        /// Pressure (bar); the working pressure when omitted
        #[arg(long)]
        pressure: Option<f64>,
        /// Temperature (°C)
        #[arg(long, default_value = "15")]
        temperature: f64,
        #[arg(long, value_enum, default_value = "operating")]
        case: CaseArg,
    },
    /// Failure indices, progressive failure and burst pressure
    Failure { id: String },
    /// Monte Carlo reliability
    Reliability {
        id: String,
        /// Number of samples
        #[arg(long)]
        samples: Option<usize>,
        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,
        /// Limit pressure (bar); working pressure × required burst ratio when omitted
        #[arg(long)]
        limit: Option<f64>,
    },
    /// Mass, volume, cost and burst summary
    Summary { id: String },
    /// Write one design to a JSON file
    Export { id: String, path: PathBuf },
    /// Print the effective analysis configuration as TOML
    Config,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    Fiber,
    Resin,
    Liner,
    Boss,
}

impl From<KindArg> for MaterialKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Fiber => MaterialKind::Fiber,
            KindArg::Resin => MaterialKind::Resin,
            KindArg::Liner => MaterialKind::Liner,
            KindArg::Boss => MaterialKind::Boss,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CaseArg {
    Operating,
    Burst,
    Cyclic,
}

impl From<CaseArg> for LoadCaseType {
    fn from(case: CaseArg) -> Self {
        match case {
            CaseArg::Operating => LoadCaseType::Operating,
            CaseArg::Burst => LoadCaseType::Burst,
            CaseArg::Cyclic => LoadCaseType::Cyclic,
        }
    }
}

/// One line of the `designs` listing
#[derive(Serialize)]
struct DesignEntry<'a> {
    id: &'a str,
    name: &'a str,
    nominal_working_pressure_bar: f64,
    layer_count: usize,
    inner_radius_mm: f64,
    wall_thickness_mm: f64,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serializing output")?;
    println!("{}", json);
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => AnalysisConfig::load(path).with_context(|| format!("loading config {}", path.display())),
        None => Ok(AnalysisConfig::default()),
    }
}

fn load_registry(path: Option<&Path>) -> Result<MaterialRegistry> {
    match path {
        Some(path) => MaterialRegistry::standard_with_file(path)
            .with_context(|| format!("loading materials {}", path.display())),
        None => Ok(MaterialRegistry::standard()),
    }
}

fn load_designs(path: Option<&Path>) -> Result<DesignCatalog> {
    match path {
        Some(path) => load_catalog(path).with_context(|| format!("loading designs {}", path.display())),
        None => Ok(DesignCatalog::reference()),
    }
}

fn run(args: Args) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let registry = load_registry(args.materials.as_deref())?;
    let catalog = load_designs(args.designs.as_deref())?;
    let ctx = ReportContext::new(&catalog, &registry, &config);

    tracing::debug!(designs = catalog.len(), materials = registry.len(), "inputs loaded");

    match args.command {
        Commands::Designs => {
            let entries: Vec<DesignEntry> = catalog
                .list()
                .map(|d| DesignEntry {
                    id: &d.id,
                    name: &d.name,
                    nominal_working_pressure_bar: d.nominal_working_pressure_bar,
                    layer_count: d.layers.len(),
                    inner_radius_mm: d.geometry.inner_radius_mm,
                    wall_thickness_mm: d.geometry.wall_thickness_mm,
                })
                .collect();
            print_json(&entries)
        }
        Commands::Materials { kind } => {
            let materials: Vec<_> = match kind {
                Some(kind) => registry.by_kind(kind.into()),
                None => registry.iter().collect(),
            };
            print_json(&materials)
        }
        Commands::Stress {
            id,
            pressure,
            temperature,
            case,
        } => {
            let design = ctx.design(&id)?;
            let load = LoadCase::new(pressure.unwrap_or(design.nominal_working_pressure_bar), case.into())
                .with_temperature(temperature);
            print_json(&ctx.stress_report_at(&id, &load)?)
        }
        Commands::Failure { id } => print_json(&ctx.failure_report(&id)?),
        Commands::Reliability {
            id,
            samples,
            seed,
            limit,
        } => {
            let options = ReliabilityOptions {
                sample_count: samples,
                seed,
                limit_pressure_bar: limit,
            };
            print_json(&ctx.reliability_report(&id, &options)?)
        }
        Commands::Summary { id } => print_json(&ctx.summary(&id)?),
        Commands::Export { id, path } => {
            let design = ctx.design(&id)?;
            save_design(design, &path).with_context(|| format!("exporting {} to {}", id, path.display()))?;
            tracing::info!(design = %id, path = %path.display(), "design exported");
            Ok(())
        }
        Commands::Config => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            match err.downcast_ref::<CalcError>() {
                Some(calc) => {
                    if let Ok(json) = serde_json::to_string_pretty(calc) {
                        eprintln!();
                        eprintln!("Error JSON:");
                        eprintln!("{}", json);
                    }
                    if calc.is_client_error() {
                        ExitCode::from(2)
                    } else {
                        ExitCode::from(1)
                    }
                }
                None => ExitCode::from(1),
            }
        }
    }
}
