//! CLI module
//!
//! Command-line interface for running the tap.
//!
//! # Commands
//!
//! - `check` - Test credentials and API access
//! - `discover` - Print the stream catalog
//! - `read` - Extract records from streams
//! - `spec` - Print the configuration schema

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
