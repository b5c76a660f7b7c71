use lopdf::Document;

use crate::{DocumentDecoder, ExtractError};

/// PDF text extraction via `lopdf`, page by page in page order.
pub struct PdfDecoder;

impl PdfDecoder {
    fn malformed(error: impl std::fmt::Display) -> ExtractError {
        ExtractError::Malformed {
            format: "pdf",
            reason: error.to_string(),
        }
    }
}

impl DocumentDecoder for PdfDecoder {
    fn format(&self) -> &'static str {
        "pdf"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["pdf"]
    }

    fn decode(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        let document = Document::load_mem(bytes).map_err(Self::malformed)?;
        let pages: Vec<u32> = document.get_pages().keys().copied().collect();
        document.extract_text(&pages).map_err(Self::malformed)
    }
}
