#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use redline_extract::{DecoderRegistry, DocumentDecoder, ExtractError};
use redline_llm::{CapabilityError, Completion, CompletionProvider, CompletionRequest, Usage};
use redline_pipeline::{AnalysisEvent, EventSink};

/// Provider double that replays queued completions and records every request.
#[derive(Clone, Default)]
pub struct SequenceProvider {
    responses: Arc<Mutex<VecDeque<Result<String, CapabilityError>>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl SequenceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_text(&self, text: &str) {
        self.responses
            .lock()
            .expect("responses mutex")
            .push_back(Ok(text.to_string()));
    }

    pub fn push_error(&self, error: CapabilityError) {
        self.responses
            .lock()
            .expect("responses mutex")
            .push_back(Err(error));
    }

    pub fn recorded_requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().expect("requests mutex").clone()
    }
}

#[async_trait]
impl CompletionProvider for SequenceProvider {
    fn name(&self) -> &str {
        "sequence"
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

/// Decoder double returning fixed text for the `docx` extension.
pub struct StaticDocxDecoder {
    text: String,
}

impl DocumentDecoder for StaticDocxDecoder {
    fn format(&self) -> &'static str {
        "docx"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["docx"]
    }

    fn decode(&self, _bytes: &[u8]) -> Result<String, ExtractError> {
        Ok(self.text.clone())
    }
}

pub fn docx_stub_registry(text: &str) -> Arc<DecoderRegistry> {
    let mut registry = DecoderRegistry::new();
    registry.register(Arc::new(StaticDocxDecoder {
        text: text.to_string(),
    }));
    Arc::new(registry)
}

/// Event sink that captures every emitted event for later assertions.
pub fn capture_sink() -> (EventSink, Arc<Mutex<Vec<AnalysisEvent>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let observer_seen = Arc::clone(&seen);
    let sink = EventSink::with_observer(Arc::new(move |event: &AnalysisEvent| {
        observer_seen
            .lock()
            .expect("events mutex")
            .push(event.clone());
    }));
    (sink, seen)
}
