use std::path::PathBuf;

use clap::Parser;

use crate::Commands;

/// Command-line arguments for the notebook
#[derive(Parser)]
#[clap(
    version,
    about = "Local notebook: pages, pins, exports and autosave"
)]
pub struct Cli {
    /// Path to the configuration file
    #[clap(short = 'c', long, value_parser)]
    pub config: Option<PathBuf>,

    /// Directory holding the notebook data (overrides the config file)
    #[clap(long, value_parser)]
    pub data_dir: Option<PathBuf>,

    /// Verbose output mode
    #[clap(short, long)]
    pub verbose: bool,

    /// Subcommands for the notebook application
    #[clap(subcommand)]
    pub command: Commands,
}
