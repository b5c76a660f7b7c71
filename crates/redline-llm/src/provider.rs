use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::CapabilityError;
use crate::openai::OpenAiProvider;
use crate::types::{Completion, CompletionRequest};

/// Provider contract for the text-generation capability.
///
/// The pipeline treats implementations as untrusted black boxes: a completion
/// either arrives or the call fails; nothing about the text is validated here.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, CapabilityError>;
}

pub type SharedProvider = Arc<dyn CompletionProvider>;

/// Build a provider from environment variables, if one is configured.
///
/// Returns `Ok(None)` when no provider credentials are present.
pub fn provider_from_env() -> Result<Option<SharedProvider>, CapabilityError> {
    match OpenAiProvider::from_env()? {
        Some(provider) => Ok(Some(Arc::new(provider))),
        None => Ok(None),
    }
}
