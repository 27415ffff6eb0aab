//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::config::{load_config, TapConfig};
use crate::engine::SyncConfig;
use crate::error::{Error, Result};
use crate::output::{JsonLinesWriter, MessageSink};
use crate::tap::{StreamStatus, SyncStatus, Tap};
use serde_json::{json, Value};
use std::io::{self, Stdout, Write};
use tracing::info;

/// CLI runner
///
/// Every message goes to the wrapped writer as one JSON line; logs go to
/// stderr through `tracing`.
pub struct Runner<W: Write + Send = Stdout> {
    cli: Cli,
    out: JsonLinesWriter<W>,
}

impl Runner<Stdout> {
    /// Create a runner writing to stdout
    pub fn new(cli: Cli) -> Self {
        Self::with_output(cli, io::stdout())
    }
}

impl<W: Write + Send> Runner<W> {
    /// Create a runner writing to `writer`
    pub fn with_output(cli: Cli, writer: W) -> Self {
        Self {
            cli,
            out: JsonLinesWriter::new(writer),
        }
    }

    /// Unwrap the output writer
    pub fn into_output(self) -> W {
        self.out.into_inner()
    }

    /// Run the CLI command
    pub async fn run(&mut self) -> Result<()> {
        match self.cli.command.clone() {
            Commands::Check => self.check().await,
            Commands::Discover => self.discover(),
            Commands::Read { max_pages, .. } => self.read(max_pages).await,
            Commands::Spec => self.spec(),
        }
    }

    /// Load the tap configuration; inline JSON wins over the file
    fn load_config(&self) -> Result<TapConfig> {
        if let Some(json_str) = &self.cli.config_json {
            return TapConfig::from_json_str(json_str);
        }

        match &self.cli.config {
            Some(path) => load_config(path),
            None => Err(Error::config("Config not specified (use -C flag)")),
        }
    }

    /// Check connection
    async fn check(&mut self) -> Result<()> {
        let config = self.load_config()?;
        let tap = Tap::new(&config)?;

        info!("Checking connection to {}", config.api_url);
        let result = tap.check().await;

        self.output_message(&json!({
            "type": "CONNECTION_STATUS",
            "connectionStatus": {
                "status": if result.success { "SUCCEEDED" } else { "FAILED" },
                "message": match result.message {
                    Some(m) => format!("Connection failed: {m}"),
                    None => "Connection successful".to_string(),
                }
            }
        }))
    }

    /// Discover streams
    fn discover(&mut self) -> Result<()> {
        let config = self.load_config()?;
        let tap = Tap::new(&config)?;

        self.output_message(&json!({
            "type": "CATALOG",
            "catalog": tap.catalog()
        }))
    }

    /// Read the selected streams
    async fn read(&mut self, max_pages: Option<u64>) -> Result<()> {
        let config = self.load_config()?;
        let selection = self.cli.command.selected_streams();

        let mut sync_config = SyncConfig::new();
        if let Some(max) = max_pages {
            sync_config = sync_config.with_max_pages(max);
        }

        let mut tap = Tap::new(&config)?.with_sync_config(sync_config);
        let report = tap.sync(&selection, &mut self.out).await?;

        let status = report.status();
        self.output_message(&json!({
            "type": "SYNC_SUMMARY",
            "summary": {
                "status": status,
                "total_records": report.total_records(),
                "total_streams": report.streams.len(),
                "successful_streams": report.count(StreamStatus::Succeeded),
                "failed_streams": report.count(StreamStatus::Failed),
                "skipped_streams": report.count(StreamStatus::Skipped),
                "duration_ms": report.duration_ms,
                "streams": report.streams
            }
        }))?;
        self.out.flush().await?;

        if status == SyncStatus::Failed {
            return Err(Error::Other(format!(
                "All {} selected streams failed",
                report.streams.len()
            )));
        }

        Ok(())
    }

    /// Show spec
    fn spec(&mut self) -> Result<()> {
        self.output_message(&json!({
            "type": "SPEC",
            "spec": {
                "name": "tap-criteo",
                "connectionSpecification": TapConfig::spec()
            }
        }))
    }

    fn output_message(&mut self, msg: &Value) -> Result<()> {
        self.out.write_json(msg)
    }
}
