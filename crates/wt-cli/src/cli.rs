//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::compute::ComputeArgs;

/// Working-time calculator.
///
/// Reads clock-in/clock-out pairs from a CSV sheet and writes back the time
/// that falls inside the configured work periods.
#[derive(Debug, Parser)]
#[command(name = "wt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compute counted working time for every row of a sheet.
    Compute(ComputeArgs),

    /// Show the effective configuration and work periods.
    Config,
}
