//! Comma-delimited group writer
//!
//! Each group file starts with the header row. Cells are joined with commas
//! exactly as read: no quoting or escaping is applied, so cells containing
//! commas or line breaks will not survive a round trip.

use super::files::{close_artifact, create_artifact, LINE_ENDING};
use super::types::{GroupWriter, OutputFormat};
use crate::error::Result;
use crate::split::Header;
use csv::StringRecord;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

const COMMA_DELIMITER: &str = ",";

/// Writes one `<group>.csv` file per group key
#[derive(Debug, Default)]
pub struct CsvGroupWriter {
    /// Directory receiving the group files
    output_root: PathBuf,
    /// Open group files keyed by group key
    writers: HashMap<String, BufWriter<File>>,
    /// Created files in creation order
    artifacts: Vec<PathBuf>,
    /// Distinct groups seen in this run
    groups: usize,
}

impl CsvGroupWriter {
    /// Create a new delimited writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the group file and write the header line
    fn open_group(&mut self, header: &Header, group_key: &str) -> Result<()> {
        let file_name = format!("{group_key}{}", OutputFormat::Csv.extension());
        let (path, file) = create_artifact(&self.output_root, &file_name)?;

        let mut writer = BufWriter::new(file);
        write_line(&mut writer, header.cells().iter().map(String::as_str))?;

        self.writers.insert(group_key.to_string(), writer);
        self.artifacts.push(path);
        self.groups += 1;
        Ok(())
    }
}

impl GroupWriter for CsvGroupWriter {
    fn initialize(&mut self, output_root: &Path) {
        self.output_root = output_root.to_path_buf();
        self.writers.clear();
        self.artifacts.clear();
        self.groups = 0;
    }

    fn write_row(&mut self, row: &StringRecord, header: &Header, group_key: &str) -> Result<()> {
        if !self.writers.contains_key(group_key) {
            self.open_group(header, group_key)?;
        }

        if let Some(writer) = self.writers.get_mut(group_key) {
            write_line(writer, row.iter())?;
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        let mut first_error = None;

        for (group_key, writer) in self.writers.drain() {
            if let Err(e) = close_artifact(writer) {
                warn!(group = %group_key, "Failed to close group file: {e}");
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

/// Write cells joined by commas followed by the platform line ending
fn write_line<'a, W, I>(writer: &mut W, cells: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a str>,
{
    for (i, cell) in cells.into_iter().enumerate() {
        if i > 0 {
            writer.write_all(COMMA_DELIMITER.as_bytes())?;
        }
        writer.write_all(cell.as_bytes())?;
    }
    writer.write_all(LINE_ENDING.as_bytes())
}
