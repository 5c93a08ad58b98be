//! PDF text extraction utilities.
//!
//! Text is extracted in memory with the pdf-extract crate. Extraction is
//! CPU-bound and the parser can panic on malformed input, so
//! [`extract_text_blocking`] runs it on the blocking pool and reports a panic
//! as an ordinary extraction failure.

use thiserror::Error;

/// Errors that can occur during PDF extraction
#[derive(Debug, Error)]
pub enum PdfExtractError {
    #[error("Not a PDF document (got {0} bytes without a %PDF header)")]
    NotPdf(usize),

    #[error("Failed to extract text from PDF: {0}")]
    ExtractionFailed(String),

    #[error("PDF parser aborted: {0}")]
    Aborted(String),
}

/// Extract text from an in-memory PDF document.
pub fn extract_text(bytes: &[u8]) -> Result<String, PdfExtractError> {
    if !looks_like_pdf(bytes) {
        return Err(PdfExtractError::NotPdf(bytes.len()));
    }

    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| PdfExtractError::ExtractionFailed(e.to_string()))?;

    if text.trim().is_empty() {
        // Scanned or image-only PDFs come back empty
        tracing::debug!("Extracted empty text from {} byte PDF", bytes.len());
    }

    Ok(text)
}

/// Run [`extract_text`] on the blocking thread pool.
pub async fn extract_text_blocking(bytes: Vec<u8>) -> Result<String, PdfExtractError> {
    tokio::task::spawn_blocking(move || extract_text(&bytes))
        .await
        .map_err(|e| PdfExtractError::Aborted(e.to_string()))?
}

/// PDF files start with "%PDF-", possibly after a few junk bytes.
fn looks_like_pdf(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(1024)];
    head.windows(5).any(|w| w == b"%PDF-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_pdf() {
        let result = extract_text(b"<html>not found</html>");
        assert!(matches!(result, Err(PdfExtractError::NotPdf(22))));
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(extract_text(b""), Err(PdfExtractError::NotPdf(0))));
    }

    #[test]
    fn test_looks_like_pdf() {
        assert!(looks_like_pdf(b"%PDF-1.7\n..."));
        assert!(looks_like_pdf(b"\n\n%PDF-1.4"));
        assert!(!looks_like_pdf(b"PDF"));
    }

    #[tokio::test]
    async fn test_truncated_pdf_is_an_error() {
        let result = extract_text_blocking(b"%PDF-1.4\n%%EOF".to_vec()).await;
        assert!(result.is_err());
    }
}
