//! Splitting module
//!
//! Partitions the data rows of a CSV stream by buyer.
//!
//! # Overview
//!
//! A run goes through these steps:
//! - Read the header row, strip its byte-order mark, resolve column positions
//! - Stream the data rows, skipping rows with an empty buyer
//! - Hand each row to the active [`GroupWriter`](crate::output::GroupWriter)
//! - Finalize every artifact once the stream is exhausted

mod header;
mod splitter;

pub use header::{
    cell, normalize_header, resolve_column, ColumnIndices, Header, BUYER_COLUMN,
    IMAGE_NAME_COLUMN, INVOICE_IMAGE_COLUMN, UTF8_BOM,
};
pub use splitter::{InvoiceSplitter, SplitReport};
