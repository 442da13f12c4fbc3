//! Guideline document text extraction.
//!
//! The whole PDF is flattened to one string with [`pdf_extract`]; layout is
//! not preserved.

use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF extraction error: {0}")]
    Extraction(String),
}

/// Read a PDF and return the text of all its pages.
pub fn read_pdf_text(path: &Path) -> Result<String, DocumentError> {
    let bytes = std::fs::read(path)?;
    let text = pdf_extract::extract_text_from_mem(&bytes)
        .map_err(|e| DocumentError::Extraction(format!("failed to extract text from PDF: {e}")))?;

    log::debug!(
        "Extracted {} characters of text from {}",
        text.len(),
        path.display()
    );

    Ok(text)
}
