//! Integration tests for whole splitting runs
//!
//! Tests the full flow: CSV bytes → splitter → per-buyer files on disk

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use invoice_splitter::output::{FixedOutputRoot, OutputFormat, TimestampedOutputRoot, LINE_ENDING};
use invoice_splitter::{Error, FaultKind, InvoiceSplitter};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;
use test_case::test_case;

const BASE64_JPG: &str = "/9j/4AAQSkZJRgABAQEAeAB4AAD/4QAiRXhpZgAATU0AKgAAAAgAAQESAAMAAAABAAEAAAAAAAD/2wBDAAIBAQIBAQICAgICAgICAwUDAwMDAwYEBAMFBwYHBwcGBwcICQsJCAgKCAcHCg0KCgsMDAwMBwkODw0MDgsMDAz/2wBDAQICAgMDAwYDAwYMCAcIDAwMDAwMDAwMDAwMDAwMDAwMDAwMDAwMDAwMDAwMDAwMDAwMDAwMDAwMDAwMDAwMDAz/wAARCAABAAEDASIAAhEBAxEB/8QAHwAAAQUBAQEBAQEAAAAAAAAAAAECAwQFBgcICQoL/8QAtRAAAgEDAwIEAwUFBAQAAAF9AQIDAAQRBRIhMUEGE1FhByJxFDKBkaEII0KxwRVS0fAkM2JyggkKFhcYGRolJicoKSo0NTY3ODk6Q0RFRkdISUpTVFVWV1hZWmNkZWZnaGlqc3R1dnd4eXqDhIWGh4iJipKTlJWWl5iZmqKjpKWmp6ipqrKztLW2t7i5usLDxMXGx8jJytLT1NXW19jZ2uHi4+Tl5ufo6erx8vP09fb3+Pn6/8QAHwEAAwEBAQEBAQEBAQAAAAAAAAECAwQFBgcICQoL/8QAtREAAgECBAQDBAcFBAQAAQJ3AAECAxEEBSExBhJBUQdhcRMiMoEIFEKRobHBCSMzUvAVYnLRChYkNOEl8RcYGRomJygpKjU2Nzg5OkNERUZHSElKU1RVVldYWVpjZGVmZ2hpanN0dXZ3eHl6goOEhYaHiImKkpOUlZaXmJmaoqOkpaanqKmqsrO0tba3uLm6wsPExcbHyMnK0tPU1dbX2Nna4uPk5ebn6Onq8vP09fb3+Pn6/9oADAMBAAIRAxEAPwD9/KKKKAP/2Q==";
const BASE64_PNG: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAAAXNSR0IArs4c6QAAAARnQU1BAACxjwv8YQUAAAAJcEhZcwAAEnQAABJ0Ad5mH3gAAAANSURBVBhXY/j///9/AAn7A/0FQ0XKAAAAAElFTkSuQmCC";
const BASE64_TIF: &str = "SUkqAA4AAACAP+BP+AgTAP4ABAABAAAAAAAAAAABBAABAAAAAQAAAAEBBAABAAAAAQAAAAIBAwAEAAAA+AAAAAMBAwABAAAABQAAAAYBAwABAAAAAgAAABEBBAABAAAACAAAABIBAwABAAAAAQAAABUBAwABAAAABAAAABYBBAABAAAAAQAAABcBBAABAAAABgAAABoBBQABAAAAAAEAABsBBQABAAAACAEAABwBAwABAAAAAQAAACgBAwABAAAAAgAAAD0BAwABAAAAAgAAAFIBAwABAAAAAgAAAJBQAwBAAAAAEAEAAJFQAwBAAAAAkAEAAAAAAAAIAAgACAAIALbUAQDoAwAAttQBAOgDAAACAAEAAQACAAMABQAGAAcAAQABAAIAAgADAAcABwAHAAIAAgACAAMABQAHAAgABwACAAIAAwADAAYACgAKAAcAAgADAAQABwAIAA0ADAAJAAMABAAHAAgACgAMAA4ACwAGAAgACQAKAAwADwAOAAwACQALAAsADAANAAwADAAMAAIAAgADAAYADAAMAAwADAACAAMAAwAIAAwADAAMAAwAAwADAAcADAAMAAwADAAMAAYACAAMAAwADAAMAAwADAAMAAwADAAMAAwADAAMAAwADAAMAAwADAAMAAwADAAMAAwADAAMAAwADAAMAAwADAAMAAwADAAMAAwADAAMAAwADAAMAAwA";

const HEADER: &str = "buyer,image_name,invoice_image";

fn input_csv() -> String {
    format!(
        "{HEADER}\nJohn,image1.jpg,{BASE64_JPG}\nJane,image2.png,{BASE64_PNG}\nJohn,image3.tif,{BASE64_TIF}\n"
    )
}

fn missing_buyer_value_csv() -> String {
    format!(
        "{HEADER}\nJohn,image1.jpg,{BASE64_JPG}\n,image2.png,{BASE64_PNG}\nJane,image3.tif,{BASE64_TIF}\n"
    )
}

const MISSING_BUYER_HEADER_CSV: &str =
    "seller,image_name,invoice_image\nJohn,Doe,123\nJane,Smith,456\n";

fn splitter(root: &Path, format: OutputFormat) -> InvoiceSplitter {
    InvoiceSplitter::new(Arc::new(FixedOutputRoot::new(root)), format)
}

fn dir_entries(path: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(path)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

fn decoded(base64: &str) -> Vec<u8> {
    STANDARD.decode(base64).unwrap()
}

// ============================================================================
// Delimited Output
// ============================================================================

#[test]
fn test_split_to_csv() {
    let dir = tempdir().unwrap();

    let report = splitter(dir.path(), OutputFormat::Csv)
        .split(input_csv().as_bytes())
        .unwrap();

    assert_eq!(dir_entries(dir.path()), vec!["Jane.csv", "John.csv"]);
    assert_eq!(report.groups, 2);
    assert_eq!(report.rows_written, 3);

    let john = fs::read_to_string(dir.path().join("John.csv")).unwrap();
    assert_eq!(
        john,
        format!(
            "{HEADER}{LINE_ENDING}John,image1.jpg,{BASE64_JPG}{LINE_ENDING}John,image3.tif,{BASE64_TIF}{LINE_ENDING}"
        )
    );

    let jane = fs::read_to_string(dir.path().join("Jane.csv")).unwrap();
    assert_eq!(jane.lines().count(), 2);
    assert_eq!(jane.lines().next(), Some(HEADER));
}

// ============================================================================
// Markup Output
// ============================================================================

#[test]
fn test_split_to_xml() {
    let dir = tempdir().unwrap();

    let report = splitter(dir.path(), OutputFormat::Xml)
        .split(input_csv().as_bytes())
        .unwrap();

    assert_eq!(
        dir_entries(dir.path()),
        vec!["Jane.xml", "John.xml", "image1.jpg", "image2.png", "image3.tif"]
    );
    assert_eq!(report.artifacts.len(), 5);

    // Attachments are exact decodes of the cells
    assert_eq!(fs::read(dir.path().join("image1.jpg")).unwrap(), decoded(BASE64_JPG));
    assert_eq!(fs::read(dir.path().join("image2.png")).unwrap(), decoded(BASE64_PNG));
    assert_eq!(fs::read(dir.path().join("image3.tif")).unwrap(), decoded(BASE64_TIF));

    let john = fs::read_to_string(dir.path().join("John.xml")).unwrap();
    assert_eq!(
        john,
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?><invoices>"#,
            "<invoice><buyer>John</buyer><image_name>image1.jpg</image_name></invoice>",
            "<invoice><buyer>John</buyer><image_name>image3.tif</image_name></invoice>",
            "</invoices>"
        )
    );
}

#[test]
fn test_xml_attachment_round_trip() {
    let dir = tempdir().unwrap();
    let original: Vec<u8> = (0..2048u32).map(|i| (i * 31 % 251) as u8).collect();
    let input = format!("{HEADER}\nJohn,blob.bin,{}\n", STANDARD.encode(&original));

    splitter(dir.path(), OutputFormat::Xml)
        .split(input.as_bytes())
        .unwrap();

    assert_eq!(fs::read(dir.path().join("blob.bin")).unwrap(), original);
}

// ============================================================================
// Skipped Rows and Faults
// ============================================================================

#[test_case(OutputFormat::Csv, &["Jane.csv", "John.csv"] ; "csv")]
#[test_case(OutputFormat::Xml, &["Jane.xml", "John.xml", "image1.jpg", "image3.tif"] ; "xml")]
fn test_split_missing_buyer_value(format: OutputFormat, expected: &[&str]) {
    let dir = tempdir().unwrap();

    let report = splitter(dir.path(), format)
        .split(missing_buyer_value_csv().as_bytes())
        .unwrap();

    assert_eq!(dir_entries(dir.path()), expected);
    assert_eq!(report.rows_skipped, 1);
    assert!(!dir.path().join("image2.png").exists());
}

#[test_case(OutputFormat::Csv ; "csv")]
#[test_case(OutputFormat::Xml ; "xml")]
fn test_split_missing_buyer_header(format: OutputFormat) {
    let dir = tempdir().unwrap();

    let err = splitter(dir.path(), format)
        .split(MISSING_BUYER_HEADER_CSV.as_bytes())
        .unwrap_err();

    assert!(matches!(err, Error::MissingGroupingColumn { .. }));
    assert_eq!(err.kind(), FaultKind::InvalidInput);
    assert!(dir_entries(dir.path()).is_empty());
}

#[test_case(OutputFormat::Csv ; "csv")]
#[test_case(OutputFormat::Xml ; "xml")]
fn test_split_only_headers(format: OutputFormat) {
    let dir = tempdir().unwrap();

    let report = splitter(dir.path(), format)
        .split(HEADER.as_bytes())
        .unwrap();

    assert!(report.artifacts.is_empty());
    assert!(dir_entries(dir.path()).is_empty());
}

#[test]
fn test_split_invalid_attachment_keeps_earlier_groups_closed() {
    let dir = tempdir().unwrap();
    let input = format!("{HEADER}\nJane,image2.png,{BASE64_PNG}\nJohn,bad.png,***\n");

    let err = splitter(dir.path(), OutputFormat::Xml)
        .split(input.as_bytes())
        .unwrap_err();

    assert!(matches!(err, Error::InvalidAttachment { .. }));
    assert!(!dir.path().join("bad.png").exists());
    // Documents opened before the fault were still closed
    let jane = fs::read_to_string(dir.path().join("Jane.xml")).unwrap();
    assert!(jane.ends_with("</invoices>"));
}

// ============================================================================
// Output Root Resolution
// ============================================================================

#[test]
fn test_timestamped_runs_do_not_collide() {
    let dir = tempdir().unwrap();
    let splitter = InvoiceSplitter::new(
        Arc::new(TimestampedOutputRoot::new(dir.path())),
        OutputFormat::Csv,
    );

    let first = splitter.split(input_csv().as_bytes()).unwrap();
    let second = splitter.split(input_csv().as_bytes()).unwrap();

    assert_ne!(first.output_root, second.output_root);
    assert_eq!(first.output_root.parent(), Some(dir.path()));
    assert!(first.output_root.join("John.csv").exists());
    assert!(second.output_root.join("John.csv").exists());
}

#[test]
fn test_concurrent_runs_are_isolated() {
    let dir = tempdir().unwrap();
    let splitter = Arc::new(InvoiceSplitter::new(
        Arc::new(TimestampedOutputRoot::new(dir.path())),
        OutputFormat::Xml,
    ));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let splitter = Arc::clone(&splitter);
            std::thread::spawn(move || splitter.split(input_csv().as_bytes()).unwrap())
        })
        .collect();

    let reports: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for report in &reports {
        assert_eq!(dir_entries(&report.output_root).len(), 5);
    }
    assert_eq!(dir_entries(dir.path()).len(), 4);
}
