//! Output module
//!
//! Supports: comma-delimited text, XML with extracted attachments
//!
//! # Overview
//!
//! This module provides:
//! - The [`GroupWriter`] contract shared by every output format
//! - One writer per [`OutputFormat`], selected through [`build_writer`]
//! - Output root resolution for splitting runs

mod delimited;
mod files;
mod root;
mod types;
mod xml;

pub use delimited::CsvGroupWriter;
pub use files::{check_file_name, decode_attachment, LINE_ENDING};
pub use root::{FixedOutputRoot, OutputRootResolver, TimestampedOutputRoot};
pub use types::{GroupWriter, OutputFormat};
pub use xml::{XmlGroupWriter, XmlStreamWriter};

/// Build the group writer for an output format
pub fn build_writer(format: OutputFormat) -> Box<dyn GroupWriter> {
    match format {
        OutputFormat::Csv => Box::new(CsvGroupWriter::new()),
        OutputFormat::Xml => Box::new(XmlGroupWriter::new()),
    }
}
