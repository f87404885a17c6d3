use crate::extract::ExtractError;

/// Extracts text from a PDF buffer in raw reading order.
///
/// Pages are decoded in ascending order; within a page, text runs are joined with a
/// single space, and pages are joined with a single space. No layout reconstruction.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractError> {
    // pdf-extract panics on some malformed content streams instead of returning Err.
    let pages = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes))
        .map_err(|_| ExtractError::ExtractionFailed("PDF parser panicked".to_string()))?
        .map_err(|e| ExtractError::ExtractionFailed(format!("Failed to parse PDF: {e}")))?;

    Ok(join_pages(&pages))
}

fn join_pages(pages: &[String]) -> String {
    pages
        .iter()
        .map(|page| collapse_runs(page))
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Collapses the line breaks and spacing pdf-extract emits between runs into single spaces.
fn collapse_runs(page: &str) -> String {
    page.split_whitespace().collect::<Vec<_>>().join(" ")
}
