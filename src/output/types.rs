//! Output types and traits
//!
//! Defines the output format selector and the per-group writer contract.

use crate::error::{Error, Result};
use crate::split::Header;
use csv::StringRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Format of the per-group artifacts
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Comma-delimited text (default)
    #[default]
    Csv,
    /// XML documents with attachments extracted to files
    Xml,
}

impl OutputFormat {
    /// File extension for group artifacts, including the dot
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => ".csv",
            OutputFormat::Xml => ".xml",
        }
    }

    /// Lowercase name used in configuration
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Xml => "xml",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "xml" => Ok(OutputFormat::Xml),
            other => Err(Error::config(format!(
                "Unknown output format '{other}' (expected csv or xml)"
            ))),
        }
    }
}

/// Trait for writers that route rows into one artifact per group key
///
/// A writer owns every handle it opens. `finalize` drains the registry, so
/// each handle is closed exactly once no matter how often it is called.
pub trait GroupWriter: Send {
    /// Reset the group registry and bind the writer to an output root
    fn initialize(&mut self, output_root: &Path);

    /// Append a row to the artifact of `group_key`, creating it on first use
    fn write_row(&mut self, row: &StringRecord, header: &Header, group_key: &str) -> Result<()>;

    /// Flush and close every open artifact
    fn finalize(&mut self) -> Result<()>;

    /// Files created so far, in creation order
    fn artifacts(&self) -> &[PathBuf];

    /// Number of distinct groups seen so far
    fn group_count(&self) -> usize;
}
