//! Upload validation for verification documents.
//!
//! Every check here runs before anything is written to storage or the
//! database, so a rejected upload leaves no trace.

use crate::error::CoreError;
use crate::types::Timestamp;

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

/// Maximum accepted file size (10 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Maximum length of owner or reviewer notes.
pub const MAX_NOTES_LENGTH: usize = 2_000;

/// Maximum length of a stored filename after sanitisation.
pub const MAX_FILENAME_LENGTH: usize = 255;

pub const MIME_JPEG: &str = "image/jpeg";
pub const MIME_PNG: &str = "image/png";
pub const MIME_PDF: &str = "application/pdf";

/// Accepted MIME types.
pub const ALLOWED_MIME_TYPES: &[&str] = &[MIME_JPEG, MIME_PNG, MIME_PDF];

/* --------------------------------------------------------------------------
Validation functions
-------------------------------------------------------------------------- */

/// Infer a MIME type from a filename extension.
///
/// Used only when the client omitted the part's content type.
pub fn mime_from_filename(filename: &str) -> Option<&'static str> {
    let (_, ext) = filename.rsplit_once('.')?;
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some(MIME_JPEG),
        "png" => Some(MIME_PNG),
        "pdf" => Some(MIME_PDF),
        _ => None,
    }
}

/// Resolve and validate the MIME type of an upload.
///
/// Returns the accepted MIME type. A declared type wins over the filename
/// extension; parameters such as `; charset=` are ignored.
pub fn resolve_mime_type(declared: Option<&str>, filename: &str) -> Result<&'static str, CoreError> {
    let declared = declared
        .map(|m| m.split(';').next().unwrap_or("").trim().to_ascii_lowercase())
        .filter(|m| !m.is_empty() && m != "application/octet-stream");

    let candidate = match declared {
        Some(m) => ALLOWED_MIME_TYPES.iter().copied().find(|allowed| *allowed == m),
        None => mime_from_filename(filename),
    };

    candidate.ok_or_else(|| {
        CoreError::Validation(format!(
            "File type not allowed. Accepted formats: {}",
            ALLOWED_MIME_TYPES.join(", ")
        ))
    })
}

/// Validate the byte size of an upload.
pub fn validate_file_size(size: u64) -> Result<(), CoreError> {
    if size == 0 {
        return Err(CoreError::Validation("Uploaded file is empty".to_string()));
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(CoreError::Validation(format!(
            "File too large ({size} bytes). Maximum size: {} MB",
            MAX_UPLOAD_BYTES / (1024 * 1024)
        )));
    }
    Ok(())
}

/// Replace every character outside `[A-Za-z0-9.-]` with `_`.
///
/// Empty names become `document`; overly long names are truncated.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let mut cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    cleaned.truncate(MAX_FILENAME_LENGTH);
    if cleaned.trim_matches('.').is_empty() {
        return "document".to_string();
    }
    cleaned
}

/// Validate optional free-text notes.
pub fn validate_notes(notes: Option<&str>) -> Result<(), CoreError> {
    if let Some(n) = notes {
        if n.chars().count() > MAX_NOTES_LENGTH {
            return Err(CoreError::Validation(format!(
                "Notes exceed maximum length of {MAX_NOTES_LENGTH} characters"
            )));
        }
    }
    Ok(())
}

/// Validate an optional expiry date supplied with an upload.
pub fn validate_expiry(expires_at: Option<Timestamp>, now: Timestamp) -> Result<(), CoreError> {
    match expires_at {
        Some(expiry) if expiry <= now => Err(CoreError::Validation(
            "Document expiry date must be in the future".to_string(),
        )),
        _ => Ok(()),
    }
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
