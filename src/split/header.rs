//! Header normalization and column resolution
//!
//! The header row is read once per run. Its first cell may carry a UTF-8
//! byte-order mark that has to be stripped before column names are matched.

use csv::StringRecord;

/// UTF-8 byte-order mark as it appears after decoding
pub const UTF8_BOM: char = '\u{feff}';

/// Column whose value decides which group a row belongs to
pub const BUYER_COLUMN: &str = "buyer";

/// Column holding the file name of a row's attachment
pub const IMAGE_NAME_COLUMN: &str = "image_name";

/// Column holding the base64 encoded attachment content
pub const INVOICE_IMAGE_COLUMN: &str = "invoice_image";

/// Strip a leading byte-order mark from the first header cell
///
/// Only the first cell is touched and only one mark is removed.
pub fn normalize_header<'a, I>(cells: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    cells
        .into_iter()
        .enumerate()
        .map(|(i, cell)| {
            if i == 0 {
                cell.strip_prefix(UTF8_BOM).unwrap_or(cell).to_string()
            } else {
                cell.to_string()
            }
        })
        .collect()
}

/// Position of the first header cell equal to `name`
pub fn resolve_column(header: &[String], name: &str) -> Option<usize> {
    header.iter().position(|cell| cell == name)
}

/// Look up a cell, treating a missing index or a short row as absent
pub fn cell(row: &StringRecord, index: Option<usize>) -> Option<&str> {
    index.and_then(|i| row.get(i))
}

/// Resolved positions of the well-known columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnIndices {
    /// Grouping (buyer) column
    pub grouping: Option<usize>,
    /// Attachment name (image_name) column
    pub attachment_name: Option<usize>,
    /// Attachment content (invoice_image) column
    pub attachment_content: Option<usize>,
}

impl ColumnIndices {
    /// Resolve all well-known columns against a normalized header
    pub fn resolve(header: &[String]) -> Self {
        Self {
            grouping: resolve_column(header, BUYER_COLUMN),
            attachment_name: resolve_column(header, IMAGE_NAME_COLUMN),
            attachment_content: resolve_column(header, INVOICE_IMAGE_COLUMN),
        }
    }
}

/// Normalized header row together with its resolved column indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    cells: Vec<String>,
    columns: ColumnIndices,
}

impl Header {
    /// Create a header from already normalized cells
    pub fn new(cells: Vec<String>) -> Self {
        let columns = ColumnIndices::resolve(&cells);
        Self { cells, columns }
    }

    /// Normalize and resolve the first record of a stream
    pub fn from_record(record: &StringRecord) -> Self {
        Self::new(normalize_header(record.iter()))
    }

    /// Header cells in input order
    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    /// Resolved column indices
    pub fn columns(&self) -> ColumnIndices {
        self.columns
    }

    /// Number of header cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the header has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
