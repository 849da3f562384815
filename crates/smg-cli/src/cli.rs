use clap::{Args, Parser, Subcommand};
use statmech_glass::core::composition::Composition;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "M. S. Bødker",
    version,
    about = "smg - statistical-mechanical structure model for oxide glasses: predict species distributions and fit the enthalpy parameters behind them.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to an optional configuration file in TOML format.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory holding the `Parameters/` and `Data/` trees.
    /// Overrides `data-dir` from the config file.
    #[arg(short = 'd', long, global = true, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Predict the species distribution of a single glass composition.
    Structure(StructureArgs),
    /// Sweep one component from 0 to 100 and tabulate the species distribution.
    Series(SeriesArgs),
    /// Fit the interaction enthalpies of a former against a modifier (or of Al against a former).
    FitBinary(FitBinaryArgs),
    /// Fit the coupling constant between two formers from ternary data.
    FitTernary(FitTernaryArgs),
}

/// Arguments for the `structure` subcommand.
#[derive(Args, Debug)]
pub struct StructureArgs {
    /// Composition as SYMBOL=VALUE pairs, e.g. 'Si=60,Al=10,Na=30'.
    #[arg(value_name = "COMPOSITION")]
    pub composition: Composition,

    /// Fictive temperature in K. Overrides `tg` from the config file.
    #[arg(short, long, value_name = "KELVIN")]
    pub tg: Option<f64>,

    /// Also write the species populations to a CSV file.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `series` subcommand.
#[derive(Args, Debug)]
pub struct SeriesArgs {
    /// Fixed part of the composition, e.g. 'Si=50,B=50'.
    #[arg(value_name = "COMPOSITION")]
    pub composition: Composition,

    /// Component swept over 0..=100.
    #[arg(short, long, value_name = "SYMBOL")]
    pub free: String,

    /// Fictive temperature in K. Overrides `tg` from the config file.
    #[arg(short, long, value_name = "KELVIN")]
    pub tg: Option<f64>,

    /// Write `<keys>_series.csv` into this directory instead of printing the table.
    #[arg(short, long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,
}

/// Command-line overrides of the `[fit]` table of the config file.
#[derive(Args, Debug, Default, Clone)]
pub struct FitOverrides {
    /// Number of basin hops.
    #[arg(short = 'n', long, value_name = "INT")]
    pub iterations: Option<usize>,

    /// Metropolis temperature of the basin hopping.
    #[arg(long, value_name = "FLOAT")]
    pub temperature: Option<f64>,

    /// Initial half-width of the random hop.
    #[arg(long, value_name = "FLOAT")]
    pub step_size: Option<f64>,

    /// Seed for a reproducible fit.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,
}

/// Arguments for the `fit-binary` subcommand.
#[derive(Args, Debug)]
pub struct FitBinaryArgs {
    /// Former (or intermediate) whose enthalpies are fitted, e.g. 'Si'.
    #[arg(value_name = "FORMER")]
    pub former: String,

    /// Modifier partner, or the former partner of an intermediate.
    #[arg(value_name = "PARTNER")]
    pub partner: String,

    #[command(flatten)]
    pub fit: FitOverrides,

    /// Store the fitted enthalpies under `Parameters/`.
    #[arg(long)]
    pub save: bool,
}

/// Arguments for the `fit-ternary` subcommand.
#[derive(Args, Debug)]
pub struct FitTernaryArgs {
    /// First former of the pair.
    #[arg(value_name = "FORMER_A")]
    pub first: String,

    /// Second former of the pair.
    #[arg(value_name = "FORMER_B")]
    pub second: String,

    /// Modifier of the ternary series.
    #[arg(value_name = "MODIFIER")]
    pub modifier: String,

    #[command(flatten)]
    pub fit: FitOverrides,

    /// Store the coupling constant (and its inverse) under `Parameters/MF/`.
    #[arg(long)]
    pub save: bool,
}
