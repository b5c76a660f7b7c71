//! Text-generation capability client for Redline.
//!
//! Exposes the `CompletionProvider` seam the analysis pipeline talks through,
//! plus an OpenAI-compatible HTTP adapter. Responses are plain text; callers
//! own any structured interpretation of them.

pub mod errors;
pub mod openai;
pub mod provider;
pub mod types;

pub use errors::*;
pub use openai::*;
pub use provider::*;
pub use types::*;
