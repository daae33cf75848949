//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::config::AppConfig;
use crate::error::{Result, ResultExt};
use crate::output::{FixedOutputRoot, OutputFormat, OutputRootResolver, TimestampedOutputRoot};
use crate::split::{InvoiceSplitter, SplitReport};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let mut config = AppConfig::load(self.cli.config.as_deref())?;

        match &self.cli.command {
            Commands::Split {
                input,
                output,
                format,
                exact_output,
            } => {
                let report = self.split(&config, input, output.as_ref(), *format, *exact_output)?;
                println!("{}", serde_json::to_string_pretty(&report)?);
                Ok(())
            }
            Commands::Serve { port } => {
                if let Some(port) = port {
                    config.server.port = *port;
                }
                crate::cli::serve(config).await
            }
        }
    }

    /// Split one file (or stdin) with CLI overrides applied
    fn split(
        &self,
        config: &AppConfig,
        input: &Path,
        output: Option<&PathBuf>,
        format: Option<OutputFormat>,
        exact_output: bool,
    ) -> Result<SplitReport> {
        let directory = output.unwrap_or(&config.output.directory);
        let resolver: Arc<dyn OutputRootResolver> = if exact_output {
            Arc::new(FixedOutputRoot::new(directory))
        } else {
            Arc::new(TimestampedOutputRoot::new(directory))
        };
        let splitter = InvoiceSplitter::new(resolver, format.unwrap_or(config.output.format));

        tracing::debug!(input = %input.display(), format = %splitter.format(), "Splitting file");

        if input == Path::new("-") {
            return splitter.split(io::stdin().lock());
        }

        let file = File::open(input)
            .with_context(|| format!("Failed to open input file {}", input.display()))?;
        splitter.split(BufReader::new(file))
    }
}
