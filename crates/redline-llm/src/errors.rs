use std::time::Duration;

use thiserror::Error;

/// Failure modes of the text-generation capability boundary.
#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("invalid capability configuration: {0}")]
    Configuration(String),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("capability returned status {status}: {message}")]
    Api { status: u16, message: String },
    #[error("capability call timed out after {0:?}")]
    Timeout(Duration),
    #[error("capability returned an empty completion")]
    EmptyCompletion,
}
