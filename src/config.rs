//! Application configuration
//!
//! Settings come from built-in defaults, an optional YAML file, and
//! environment variables, applied in that order.
//!
//! ```yaml
//! output:
//!   directory: outputFiles
//!   format: xml
//! server:
//!   port: 8080
//! ```

use crate::error::{Error, Result, ResultExt};
use crate::output::{OutputFormat, OutputRootResolver, TimestampedOutputRoot};
use crate::split::InvoiceSplitter;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Environment variable overriding `output.directory`
pub const ENV_OUTPUT_DIRECTORY: &str = "INVOICE_SPLITTER_OUTPUT_DIRECTORY";

/// Environment variable overriding `output.format`
pub const ENV_OUTPUT_FORMAT: &str = "INVOICE_SPLITTER_OUTPUT_FORMAT";

/// Environment variable overriding `server.port`
pub const ENV_PORT: &str = "INVOICE_SPLITTER_PORT";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where and how artifacts are written
    pub output: OutputConfig,

    /// HTTP server settings
    pub server: ServerConfig,
}

// ============================================================================
// Output Config
// ============================================================================

/// Output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Base directory; each run writes into a timestamped subdirectory
    pub directory: PathBuf,

    /// Artifact format
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("outputFiles"),
            format: OutputFormat::default(),
        }
    }
}

// ============================================================================
// Server Config
// ============================================================================

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Largest accepted upload in bytes
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}

impl AppConfig {
    /// Parse configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&contents)
    }

    /// Load defaults or the given file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (normally the process environment)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(directory) = lookup(ENV_OUTPUT_DIRECTORY) {
            self.output.directory = PathBuf::from(directory);
        }

        if let Some(format) = lookup(ENV_OUTPUT_FORMAT) {
            self.output.format = format.parse()?;
        }

        if let Some(port) = lookup(ENV_PORT) {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|e| Error::config(format!("Invalid {ENV_PORT} '{port}': {e}")))?;
        }

        Ok(())
    }

    /// Resolver handing out a fresh timestamped root per run
    pub fn resolver(&self) -> Arc<dyn OutputRootResolver> {
        Arc::new(TimestampedOutputRoot::new(&self.output.directory))
    }

    /// Splitter for the configured format and output directory
    pub fn splitter(&self) -> InvoiceSplitter {
        InvoiceSplitter::new(self.resolver(), self.output.format)
    }
}
