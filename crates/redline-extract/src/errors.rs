use thiserror::Error;

/// Failure modes of binary-to-text extraction.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The filename extension does not map to a registered decoder. Fatal to
    /// the whole analysis.
    #[error("unsupported file format: {filename}")]
    UnsupportedFormat { filename: String },
    /// The payload did not decode as the format its extension claims.
    #[error("malformed {format} document: {reason}")]
    Malformed {
        format: &'static str,
        reason: String,
    },
}
