//! Binary-to-text extraction for uploaded contract documents.
//!
//! Decoding dispatches purely on the filename extension; the actual binary
//! parsing is delegated to format-specific decoders behind the
//! [`DocumentDecoder`] trait.

pub mod docx;
pub mod errors;
pub mod pdf;

pub use docx::*;
pub use errors::*;
pub use pdf::*;

use std::collections::HashMap;
use std::sync::Arc;

/// Decoder for one document format.
pub trait DocumentDecoder: Send + Sync {
    fn format(&self) -> &'static str;

    /// Lowercase filename extensions this decoder claims.
    fn extensions(&self) -> &'static [&'static str];

    fn decode(&self, bytes: &[u8]) -> Result<String, ExtractError>;
}

/// Extension-keyed set of decoders.
#[derive(Clone, Default)]
pub struct DecoderRegistry {
    decoders: HashMap<String, Arc<dyn DocumentDecoder>>,
}

impl DecoderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the stock PDF and DOCX decoders.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(PdfDecoder));
        registry.register(Arc::new(DocxDecoder));
        registry
    }

    pub fn register(&mut self, decoder: Arc<dyn DocumentDecoder>) {
        for extension in decoder.extensions() {
            self.decoders
                .insert((*extension).to_string(), Arc::clone(&decoder));
        }
    }

    pub fn supports(&self, filename: &str) -> bool {
        file_extension(filename)
            .map(|extension| self.decoders.contains_key(&extension))
            .unwrap_or(false)
    }

    /// Decode `bytes` with the decoder selected by the filename extension.
    pub fn extract_text(&self, bytes: &[u8], filename: &str) -> Result<String, ExtractError> {
        let decoder = file_extension(filename)
            .and_then(|extension| self.decoders.get(&extension))
            .ok_or_else(|| ExtractError::UnsupportedFormat {
                filename: filename.to_string(),
            })?;
        decoder.decode(bytes)
    }
}

fn file_extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, extension)| extension.to_ascii_lowercase())
}
