//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Criteo Marketing Solutions tap
#[derive(Parser, Debug)]
#[command(name = "tap-criteo")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON, or YAML by extension)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Inline config JSON (takes precedence over --config)
    #[arg(long, global = true)]
    pub config_json: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Test credentials and API access
    Check,

    /// Print the stream catalog
    Discover,

    /// Read records from streams
    Read {
        /// Streams to sync (comma-separated, empty = all)
        #[arg(long)]
        streams: Option<String>,

        /// Maximum pages per stream pass
        #[arg(long)]
        max_pages: Option<u64>,
    },

    /// Print the configuration JSON Schema
    Spec,
}

impl Commands {
    /// Stream names passed to `read --streams`
    pub fn selected_streams(&self) -> Vec<String> {
        match self {
            Commands::Read {
                streams: Some(streams),
                ..
            } => streams
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }
}
