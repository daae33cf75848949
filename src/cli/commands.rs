//! CLI commands and argument parsing

use crate::output::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Invoice splitter CLI
#[derive(Parser, Debug)]
#[command(name = "invoice-splitter")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split a CSV file into one artifact per buyer
    Split {
        /// Input CSV file ("-" reads stdin)
        #[arg(default_value = "-")]
        input: PathBuf,

        /// Base output directory (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (overrides config)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Write directly into --output instead of a timestamped subdirectory
        #[arg(long, requires = "output")]
        exact_output: bool,
    },

    /// Start HTTP server mode
    Serve {
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
}
