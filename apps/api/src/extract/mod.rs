//! Turns uploaded résumé bytes into plain text.
//!
//! Two formats are understood: PDF (page text concatenated in page order) and
//! DOCX (body paragraphs joined with newlines). Anything else is rejected with
//! `ExtractError::UnsupportedFormat` so the caller can skip that file and keep
//! going with the rest of the batch.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod docx;
pub mod pdf;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to extract text from {kind}: {reason}")]
    ExtractionFailure { kind: DocumentKind, reason: String },
}

impl ExtractError {
    pub(crate) fn failure(kind: DocumentKind, reason: impl fmt::Display) -> Self {
        ExtractError::ExtractionFailure {
            kind,
            reason: reason.to_string(),
        }
    }
}

/// Declared type of an uploaded document, taken from its file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Resolves the kind from a file name such as `jane_doe.PDF`.
    pub fn from_file_name(file_name: &str) -> Result<Self, ExtractError> {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("pdf") => Ok(DocumentKind::Pdf),
            Some("docx") => Ok(DocumentKind::Docx),
            _ => Err(ExtractError::UnsupportedFormat(file_name.to_string())),
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Pdf => f.write_str("PDF"),
            DocumentKind::Docx => f.write_str("DOCX"),
        }
    }
}

/// Extracts plain text from a raw document.
///
/// An empty byte stream yields an empty string for every supported kind.
pub fn extract_text(bytes: &[u8], kind: DocumentKind) -> Result<String, ExtractError> {
    if bytes.is_empty() {
        return Ok(String::new());
    }

    match kind {
        DocumentKind::Pdf => pdf::extract_pdf_text(bytes),
        DocumentKind::Docx => docx::extract_docx_text(bytes),
    }
}
