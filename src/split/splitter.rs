//! Splitter orchestrator
//!
//! Drives one splitting run: read the header, stream the data rows into the
//! active group writer, finalize every artifact at the end.

use super::header::{Header, BUYER_COLUMN};
use crate::error::{Error, Result};
use crate::output::{build_writer, GroupWriter, OutputFormat, OutputRootResolver};
use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of a successful splitting run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplitReport {
    /// Directory holding every artifact of the run
    pub output_root: PathBuf,
    /// Format of the group artifacts
    pub format: OutputFormat,
    /// Number of distinct group keys
    pub groups: usize,
    /// Data rows routed to a group
    pub rows_written: usize,
    /// Data rows dropped because their group key was empty
    pub rows_skipped: usize,
    /// Group files and attachments, in creation order
    pub artifacts: Vec<PathBuf>,
}

impl SplitReport {
    fn empty(output_root: PathBuf, format: OutputFormat) -> Self {
        Self {
            output_root,
            format,
            groups: 0,
            rows_written: 0,
            rows_skipped: 0,
            artifacts: Vec::new(),
        }
    }
}

/// Splits invoice CSV streams into one artifact per buyer
///
/// Holds no per-run state: every call to [`split`](Self::split) builds a
/// fresh writer, so one splitter can serve concurrent runs.
#[derive(Clone)]
pub struct InvoiceSplitter {
    resolver: Arc<dyn OutputRootResolver>,
    format: OutputFormat,
}

impl std::fmt::Debug for InvoiceSplitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvoiceSplitter")
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

impl InvoiceSplitter {
    /// Create a splitter
    pub fn new(resolver: Arc<dyn OutputRootResolver>, format: OutputFormat) -> Self {
        Self { resolver, format }
    }

    /// Active output format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Split one input stream
    ///
    /// The input is consumed and closed on every exit path. An input without
    /// a header line is not an error and produces no artifacts. Any fault while
    /// streaming rows closes the artifacts opened so far before it is returned.
    pub fn split<R: Read>(&self, input: R) -> Result<SplitReport> {
        debug!(format = %self.format, "Splitting invoices file by buyers");

        let output_root = self.resolver.resolve();
        let mut report = SplitReport::empty(output_root.clone(), self.format);

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(input);

        let mut record = StringRecord::new();
        if !reader.read_record(&mut record)? {
            debug!("Input has no header line, nothing to split");
            return Ok(report);
        }
        let header = Header::from_record(&record);

        fs::create_dir_all(&output_root)?;
        let mut writer = build_writer(self.format);
        writer.initialize(&output_root);

        if let Err(e) = stream_rows(&mut reader, &header, writer.as_mut(), &mut report) {
            if let Err(cleanup) = writer.finalize() {
                warn!("Failed to close artifacts after error: {cleanup}");
            }
            return Err(e);
        }
        writer.finalize()?;

        report.groups = writer.group_count();
        report.artifacts = writer.artifacts().to_vec();

        debug!(
            groups = report.groups,
            rows_written = report.rows_written,
            rows_skipped = report.rows_skipped,
            output_root = %report.output_root.display(),
            "Finished splitting invoices file by buyers"
        );
        Ok(report)
    }
}

/// Route every remaining data row to its group
fn stream_rows<R: Read>(
    reader: &mut csv::Reader<R>,
    header: &Header,
    writer: &mut dyn GroupWriter,
    report: &mut SplitReport,
) -> Result<()> {
    let grouping = header.columns().grouping;
    let mut row = StringRecord::new();

    while reader.read_record(&mut row)? {
        let Some(group_key) = grouping.and_then(|i| row.get(i)) else {
            let line = row.position().map_or(0, csv::Position::line);
            return Err(Error::missing_grouping_column(BUYER_COLUMN, line));
        };

        if group_key.is_empty() {
            report.rows_skipped += 1;
            continue;
        }

        writer.write_row(&row, header, group_key)?;
        report.rows_written += 1;
    }

    Ok(())
}
