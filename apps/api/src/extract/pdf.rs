use std::io::Cursor;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, warn};

use super::{DocumentKind, ExtractError};

/// Extracts text page by page and concatenates it in page order.
///
/// A page with no extractable text contributes nothing; its failure never
/// fails the document. Text is returned exactly as lopdf decodes it.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let doc = lopdf::Document::load_from(Cursor::new(bytes))
        .map_err(|e| ExtractError::failure(DocumentKind::Pdf, e))?;

    let pages = doc.get_pages();
    debug!("PDF has {} page(s)", pages.len());

    let mut text = String::new();
    for page_num in pages.keys() {
        // lopdf can panic on some font encodings; treat that page as blank.
        let extracted = panic::catch_unwind(AssertUnwindSafe(|| doc.extract_text(&[*page_num])));
        match extracted {
            Ok(Ok(page_text)) => text.push_str(&page_text),
            Ok(Err(e)) => debug!("Page {page_num} yielded no text: {e}"),
            Err(_) => warn!("Text extraction panicked on page {page_num}; treating it as empty"),
        }
    }

    Ok(text)
}
