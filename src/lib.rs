// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Invoice Splitter
//!
//! Partitions an invoice CSV stream by buyer and renders every buyer's rows
//! into its own artifact.
//!
//! ## Features
//!
//! - **Streaming**: rows are read and routed one at a time
//! - **CSV Output**: `<buyer>.csv` with the input header on the first line
//! - **XML Output**: `<buyer>.xml` documents, base64 attachments written as files
//! - **HTTP Upload**: multipart endpoint mirroring the CLI
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use invoice_splitter::output::{OutputFormat, TimestampedOutputRoot};
//! use invoice_splitter::split::InvoiceSplitter;
//! use std::sync::Arc;
//!
//! # fn main() -> invoice_splitter::Result<()> {
//! let splitter = InvoiceSplitter::new(
//!     Arc::new(TimestampedOutputRoot::new("outputFiles")),
//!     OutputFormat::Xml,
//! );
//!
//! let input = std::fs::File::open("invoices.csv")?;
//! let report = splitter.split(input)?;
//! println!("{} buyers written to {}", report.groups, report.output_root.display());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       InvoiceSplitter                        │
//! │  resolve root → read header → stream rows → finalize all     │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//! ┌───────────────┬─────────────┴───────────┬────────────────────┐
//! │    Header     │      GroupWriter        │    Output Root     │
//! ├───────────────┼─────────────────────────┼────────────────────┤
//! │ Strip BOM     │ CsvGroupWriter          │ Timestamped        │
//! │ Resolve cols  │ XmlGroupWriter + files  │ Fixed              │
//! └───────────────┴─────────────────────────┴────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// YAML and environment configuration
pub mod config;

/// Header handling and the splitting run
pub mod split;

/// Group writers and output roots
pub mod output;

/// Command-line interface and HTTP server
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, FaultKind, Result};
pub use output::OutputFormat;
pub use split::{InvoiceSplitter, SplitReport};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
