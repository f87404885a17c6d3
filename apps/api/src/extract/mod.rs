//! Document text extractor. Converts an uploaded resume (PDF or DOCX) into plain text.
//!
//! Pure transform over an in-memory buffer. Parsing is CPU-bound, so the async entry
//! point `extract_resume_text` runs it on the blocking pool.
//!
//! CRITICAL: an empty extraction is a failure, never a valid zero-length resume.
//! Callers must not proceed to scoring without text.

pub mod docx;
pub mod pdf;

use std::path::Path;

use bytes::Bytes;
use thiserror::Error;

pub const PDF_MEDIA_TYPE: &str = "application/pdf";
pub const DOCX_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("text extraction failed: {0}")]
    ExtractionFailed(String),
}

/// The resume formats the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Detects the document kind from the declared media type, falling back to the
    /// filename extension when the media type is absent or generic
    /// (browsers often send `application/octet-stream`).
    pub fn detect(media_type: Option<&str>, filename: Option<&str>) -> Result<Self, ExtractError> {
        let media = media_type
            .map(|m| m.split(';').next().unwrap_or("").trim().to_ascii_lowercase())
            .filter(|m| !m.is_empty());

        match media.as_deref() {
            Some(PDF_MEDIA_TYPE) => return Ok(DocumentKind::Pdf),
            Some(DOCX_MEDIA_TYPE) => return Ok(DocumentKind::Docx),
            _ => {}
        }

        let extension = filename
            .and_then(|f| Path::new(f).extension())
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("pdf") => Ok(DocumentKind::Pdf),
            Some("docx") => Ok(DocumentKind::Docx),
            _ => Err(ExtractError::UnsupportedFileType(
                media
                    .or_else(|| extension.map(|e| format!(".{e}")))
                    .unwrap_or_else(|| "unknown".to_string()),
            )),
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => PDF_MEDIA_TYPE,
            DocumentKind::Docx => DOCX_MEDIA_TYPE,
        }
    }
}

/// Extracts plain text from a resume buffer. Synchronous; see `extract_resume_text`.
pub fn extract_text(bytes: &[u8], kind: DocumentKind) -> Result<String, ExtractError> {
    let text = match kind {
        DocumentKind::Pdf => pdf::extract_pdf_text(bytes)?,
        DocumentKind::Docx => docx::extract_docx_text(bytes)?,
    };

    if text.trim().is_empty() {
        return Err(ExtractError::ExtractionFailed(
            "document contains no extractable text".to_string(),
        ));
    }

    Ok(text)
}

/// Async entry point: runs extraction on the blocking pool.
/// A panic inside a parser surfaces as `ExtractionFailed`.
pub async fn extract_resume_text(bytes: Bytes, kind: DocumentKind) -> Result<String, ExtractError> {
    tokio::task::spawn_blocking(move || extract_text(&bytes, kind))
        .await
        .map_err(|e| ExtractError::ExtractionFailed(format!("extraction task failed: {e}")))?
}
