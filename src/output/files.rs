//! Artifact file helpers
//!
//! Shared by both group writers: file name checks, artifact creation,
//! handle closing and attachment decoding.

use crate::error::{Error, Result};
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Standard alphabet, padding optional
const ATTACHMENT_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Host platform line terminator
pub const LINE_ENDING: &str = if cfg!(windows) { "\r\n" } else { "\n" };

/// Ensure `name` names a file directly under the output root
pub fn check_file_name(name: &str) -> Result<&str> {
    let unsafe_name = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);

    if unsafe_name {
        return Err(Error::unsafe_file_name(name));
    }
    Ok(name)
}

/// Create (or truncate) an artifact directly under the output root
pub fn create_artifact(output_root: &Path, file_name: &str) -> Result<(PathBuf, File)> {
    let path = output_root.join(check_file_name(file_name)?);
    let file = File::create(&path)?;
    Ok((path, file))
}

/// Flush a buffered artifact and release its file handle
pub fn close_artifact(writer: BufWriter<File>) -> io::Result<()> {
    let file = writer.into_inner().map_err(io::IntoInnerError::into_error)?;
    drop(file);
    Ok(())
}

/// Decode a base64 attachment cell
pub fn decode_attachment(name: &str, content: &str) -> Result<Vec<u8>> {
    ATTACHMENT_ENGINE.decode(content).map_err(|e| {
        tracing::error!(attachment = %name, "Invalid value in invoice_image column: {e}");
        Error::invalid_attachment(name, e.to_string())
    })
}

/// Decode an attachment and write it next to the group artifacts
///
/// Nothing is written when either the name or the content is empty.
/// Returns the created path.
pub fn write_attachment(output_root: &Path, name: &str, content: &str) -> Result<Option<PathBuf>> {
    if name.is_empty() || content.is_empty() {
        return Ok(None);
    }

    let bytes = decode_attachment(name, content)?;
    let (path, mut file) = create_artifact(output_root, name)?;
    file.write_all(&bytes)?;
    file.flush()?;
    Ok(Some(path))
}
