//! Error types for the invoice splitter
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for the invoice splitter
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Input Shape Errors
    // ============================================================================
    #[error("Invalid input csv - {column} is missing at line {line}")]
    MissingGroupingColumn { column: String, line: u64 },

    #[error("Invalid value in attachment column for '{name}': {message}")]
    InvalidAttachment { name: String, message: String },

    #[error("Refusing to write outside the output directory: '{name}'")]
    UnsafeFileName { name: String },

    #[error("CSV parsing error: {message}")]
    CsvParse { message: String },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

/// Broad classification of a fault, used to pick a client or server response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// The uploaded data has the wrong shape
    InvalidInput,
    /// Storage, transport or configuration failure
    Storage,
}

impl Error {
    /// Create a missing grouping column error
    pub fn missing_grouping_column(column: impl Into<String>, line: u64) -> Self {
        Self::MissingGroupingColumn {
            column: column.into(),
            line,
        }
    }

    /// Create an invalid attachment error
    pub fn invalid_attachment(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidAttachment {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an unsafe file name error
    pub fn unsafe_file_name(name: impl Into<String>) -> Self {
        Self::UnsafeFileName { name: name.into() }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Classify this error for the caller
    pub fn kind(&self) -> FaultKind {
        match self {
            Error::MissingGroupingColumn { .. }
            | Error::InvalidAttachment { .. }
            | Error::UnsafeFileName { .. }
            | Error::CsvParse { .. } => FaultKind::InvalidInput,
            _ => FaultKind::Storage,
        }
    }

    /// Check if this error was caused by the input data
    pub fn is_invalid_input(&self) -> bool {
        self.kind() == FaultKind::InvalidInput
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            match err.into_kind() {
                csv::ErrorKind::Io(io) => Error::Io(io),
                other => Error::CsvParse {
                    message: format!("{other:?}"),
                },
            }
        } else {
            Error::CsvParse {
                message: err.to_string(),
            }
        }
    }
}

/// Result type alias for the invoice splitter
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
