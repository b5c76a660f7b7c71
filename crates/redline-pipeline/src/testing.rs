//! In-crate test doubles for the capability and decoder seams.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use redline_extract::{DocumentDecoder, ExtractError};
use redline_llm::{CapabilityError, Completion, CompletionProvider, CompletionRequest, Usage};

/// Provider stub that replays queued completions and records every request.
#[derive(Clone, Default)]
pub(crate) struct ScriptedProvider {
    responses: Arc<Mutex<VecDeque<Result<String, CapabilityError>>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl ScriptedProvider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_text(&self, text: &str) {
        self.responses
            .lock()
            .expect("responses mutex")
            .push_back(Ok(text.to_string()));
    }

    pub(crate) fn push_error(&self, error: CapabilityError) {
        self.responses
            .lock()
            .expect("responses mutex")
            .push_back(Err(error));
    }

    pub(crate) fn recorded_requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().expect("requests mutex").clone()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, CapabilityError> {
        self.requests
            .lock()
            .expect("requests mutex")
            .push(request.clone());
        match self
            .responses
            .lock()
            .expect("responses mutex")
            .pop_front()
        {
            Some(Ok(text)) => Ok(Completion {
                text,
                model: request.model,
                usage: Usage::default(),
            }),
            Some(Err(error)) => Err(error),
            None => Err(CapabilityError::Configuration(
                "no completion queued".to_string(),
            )),
        }
    }
}

/// Decoder stub returning fixed text for one extension.
pub(crate) struct StaticDecoder {
    format: &'static str,
    extensions: &'static [&'static str],
    text: String,
}

impl StaticDecoder {
    pub(crate) fn docx(text: &str) -> Self {
        Self {
            format: "docx",
            extensions: &["docx"],
            text: text.to_string(),
        }
    }
}

impl DocumentDecoder for StaticDecoder {
    fn format(&self) -> &'static str {
        self.format
    }

    fn extensions(&self) -> &'static [&'static str] {
        self.extensions
    }

    fn decode(&self, _bytes: &[u8]) -> Result<String, ExtractError> {
        Ok(self.text.clone())
    }
}
