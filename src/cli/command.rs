//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Size a residential solar installation and battery at minimum cost
#[derive(Parser, Debug)]
#[command(name = "solarsizer")]
#[command(version)]
pub struct Cli {
    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Solve the sizing model and print the recommended capacities
    Optimize(Box<OptimizeArgs>),

    /// List solver backends and whether they are available
    Solvers,

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Subcommands for `solarsizer config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write a documented configuration template.
    Init(ConfigInitArgs),
    /// Display the effective configuration with defaults applied.
    Show(ConfigPathArg),
    /// Validate a configuration file without solving.
    Validate(ConfigPathArg),
}

#[derive(Args, Debug)]
pub struct ConfigPathArg {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Where to write the template
    #[arg(default_value = "solarsizer.toml")]
    pub path: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for `solarsizer optimize`.
///
/// Precedence, lowest first: built-in defaults, `[parameters]` in the config
/// file, the `--params` JSON file, then individual flags.
#[derive(Args, Debug, Default)]
pub struct OptimizeArgs {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Solver backend to try first
    #[arg(long)]
    pub solver: Option<String>,

    /// Solver backend to try when the first is unavailable
    #[arg(long)]
    pub fallback: Option<String>,

    /// Solve timeout in seconds (0 disables)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// JSON file with parameter overrides
    #[arg(long, value_name = "FILE")]
    pub params: Option<PathBuf>,

    /// Grid price in the peak period (USD/kWh)
    #[arg(long)]
    pub peak_price: Option<f64>,

    /// Grid price in the off-peak period (USD/kWh)
    #[arg(long)]
    pub off_peak_price: Option<f64>,

    /// Battery cost (USD/kWh of capacity)
    #[arg(long)]
    pub battery_cost: Option<f64>,

    /// Energy required in the peak period (kWh)
    #[arg(long)]
    pub peak_consumption: Option<f64>,

    /// Energy required in the off-peak period (kWh)
    #[arg(long)]
    pub off_peak_consumption: Option<f64>,

    /// Installation catalogue as SIZE=COST pairs, e.g. 3=0.282,5=0.25
    #[arg(long, value_name = "PAIRS")]
    pub sizes: Option<String>,
}
