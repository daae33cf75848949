//! XML group writer
//!
//! Each group file is a document with an `invoices` root holding one
//! `invoice` element per row. The attachment content column never appears
//! in the markup: it is decoded and written to its own file instead.

use super::files::{close_artifact, create_artifact, write_attachment};
use super::types::{GroupWriter, OutputFormat};
use crate::error::Result;
use crate::split::{cell, Header};
use csv::StringRecord;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

const INVOICES_ELEMENT: &str = "invoices";
const INVOICE_ELEMENT: &str = "invoice";
const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

// ============================================================================
// XML Stream Writer
// ============================================================================

/// Minimal forward-only XML writer
///
/// Tracks open elements so the document can be closed in one call.
/// Element names are written as given; text content is escaped.
#[derive(Debug)]
pub struct XmlStreamWriter<W: Write> {
    /// Underlying sink
    inner: W,
    /// Names of the currently open elements, innermost last
    open: Vec<String>,
}

impl<W: Write> XmlStreamWriter<W> {
    /// Wrap a sink
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            open: Vec::new(),
        }
    }

    /// Write the XML declaration
    pub fn write_start_document(&mut self) -> io::Result<()> {
        self.inner.write_all(XML_DECLARATION.as_bytes())
    }

    /// Open an element
    pub fn write_start_element(&mut self, name: &str) -> io::Result<()> {
        write!(self.inner, "<{name}>")?;
        self.open.push(name.to_string());
        Ok(())
    }

    /// Write escaped character data
    pub fn write_characters(&mut self, text: &str) -> io::Result<()> {
        let mut last = 0;
        for (i, c) in text.char_indices() {
            let escaped = match c {
                '&' => "&amp;",
                '<' => "&lt;",
                '>' => "&gt;",
                _ => continue,
            };
            self.inner.write_all(text[last..i].as_bytes())?;
            self.inner.write_all(escaped.as_bytes())?;
            last = i + c.len_utf8();
        }
        self.inner.write_all(text[last..].as_bytes())
    }

    /// Close the innermost open element
    pub fn write_end_element(&mut self) -> io::Result<()> {
        let name = self.open.pop().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "No open XML element to close")
        })?;
        write!(self.inner, "</{name}>")
    }

    /// Close every element that is still open
    pub fn write_end_document(&mut self) -> io::Result<()> {
        while !self.open.is_empty() {
            self.write_end_element()?;
        }
        Ok(())
    }

    /// Number of open elements
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// End the document, flush, and hand back the sink
    pub fn finish(mut self) -> io::Result<W> {
        self.write_end_document()?;
        self.inner.flush()?;
        Ok(self.inner)
    }
}

// ============================================================================
// XML Group Writer
// ============================================================================

/// Writes one `<group>.xml` file per group key plus attachment files
#[derive(Debug, Default)]
pub struct XmlGroupWriter {
    /// Directory receiving group files and attachments
    output_root: PathBuf,
    /// Open documents keyed by group key
    writers: HashMap<String, XmlStreamWriter<BufWriter<File>>>,
    /// Created files in creation order
    artifacts: Vec<PathBuf>,
    /// Distinct groups seen in this run
    groups: usize,
}

impl XmlGroupWriter {
    /// Create a new XML writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the group document and open its root element
    fn open_group(&mut self, group_key: &str) -> Result<()> {
        let file_name = format!("{group_key}{}", OutputFormat::Xml.extension());
        let (path, file) = create_artifact(&self.output_root, &file_name)?;

        let mut writer = XmlStreamWriter::new(BufWriter::new(file));
        writer.write_start_document()?;
        writer.write_start_element(INVOICES_ELEMENT)?;

        self.writers.insert(group_key.to_string(), writer);
        self.artifacts.push(path);
        self.groups += 1;
        Ok(())
    }
}

impl GroupWriter for XmlGroupWriter {
    fn initialize(&mut self, output_root: &Path) {
        self.output_root = output_root.to_path_buf();
        self.writers.clear();
        self.artifacts.clear();
        self.groups = 0;
    }

    fn write_row(&mut self, row: &StringRecord, header: &Header, group_key: &str) -> Result<()> {
        if !self.writers.contains_key(group_key) {
            self.open_group(group_key)?;
        }

        let Self {
            output_root,
            writers,
            artifacts,
            ..
        } = self;
        let Some(writer) = writers.get_mut(group_key) else {
            return Ok(());
        };

        let columns = header.columns();
        let attachment =
            cell(row, columns.attachment_name).zip(cell(row, columns.attachment_content));

        writer.write_start_element(INVOICE_ELEMENT)?;
        for (i, name) in header.cells().iter().enumerate() {
            if Some(i) == columns.attachment_content {
                if let Some((file_name, content)) = attachment {
                    if let Some(path) = write_attachment(output_root, file_name, content)? {
                        artifacts.push(path);
                    }
                    continue;
                }
            }

            // Cells past the end of a short row are absent
            let Some(value) = row.get(i) else {
                continue;
            };
            writer.write_start_element(name)?;
            writer.write_characters(value)?;
            writer.write_end_element()?;
        }
        writer.write_end_element()?;
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        let mut first_error = None;

        for (group_key, writer) in self.writers.drain() {
            let closed = writer.finish().and_then(close_artifact);
            if let Err(e) = closed {
                warn!(group = %group_key, "Error finalizing XML document: {e}");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    fn artifacts(&self) -> &[PathBuf] {
        &self.artifacts
    }

    fn group_count(&self) -> usize {
        self.groups
    }
}
