use std::sync::Arc;

use redline_extract::DecoderRegistry;
use redline_llm::CompletionProvider;

use crate::config::PipelineConfig;
use crate::errors::{PipelineError, Stage};
use crate::events::EventEmitter;
use crate::parse;
use crate::prompts;
use crate::state::{KeyTerms, Section};

/// Stage one: decode the uploaded binary, split the text into titled sections
/// and extract the structured key terms.
pub struct DocumentProcessor {
    provider: Arc<dyn CompletionProvider>,
    decoders: Arc<DecoderRegistry>,
    config: PipelineConfig,
    events: EventEmitter,
}

#[derive(Debug)]
pub struct ProcessedDocument {
    pub text: String,
    pub sections: Vec<Section>,
    pub key_terms: KeyTerms,
}

impl DocumentProcessor {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        decoders: Arc<DecoderRegistry>,
        config: PipelineConfig,
        events: EventEmitter,
    ) -> Self {
        Self {
            provider,
            decoders,
            config,
            events,
        }
    }

    pub async fn process(
        &self,
        analysis_id: &str,
        document: &[u8],
        filename: &str,
    ) -> Result<ProcessedDocument, PipelineError> {
        let text = self.decoders.extract_text(document, filename)?;
        let sections = self.split_into_sections(analysis_id, &text).await?;
        let key_terms = self.extract_key_terms(analysis_id, &text).await?;
        Ok(ProcessedDocument {
            text,
            sections,
            key_terms,
        })
    }

    async fn split_into_sections(
        &self,
        analysis_id: &str,
        text: &str,
    ) -> Result<Vec<Section>, PipelineError> {
        let request = self.config.request(
            prompts::SECTION_SPLIT_SYSTEM,
            prompts::section_split_prompt(self.config.capped(text)),
        );
        let completion = self
            .provider
            .complete(request)
            .await
            .map_err(|source| PipelineError::capability(Stage::DocumentProcessor, source))?;

        match parse::structured::<Vec<Section>>(&completion.text) {
            Ok(sections) => Ok(sections),
            Err(error) => {
                self.events.fallback(
                    analysis_id,
                    Stage::DocumentProcessor,
                    "section_split",
                    &error.reason,
                );
                // The synthetic section spans the complete text, not the
                // capped prompt slice.
                Ok(vec![Section {
                    title: "Full Document".to_string(),
                    content: text.to_string(),
                    kind: "general".to_string(),
                }])
            }
        }
    }

    async fn extract_key_terms(
        &self,
        analysis_id: &str,
        text: &str,
    ) -> Result<KeyTerms, PipelineError> {
        let request = self.config.request(
            prompts::KEY_TERMS_SYSTEM,
            prompts::key_terms_prompt(self.config.capped(text)),
        );
        let completion = self
            .provider
            .complete(request)
            .await
            .map_err(|source| PipelineError::capability(Stage::DocumentProcessor, source))?;

        match parse::structured::<KeyTerms>(&completion.text) {
            Ok(key_terms) => Ok(key_terms),
            Err(error) => {
                self.events.fallback(
                    analysis_id,
                    Stage::DocumentProcessor,
                    "key_terms",
                    &error.reason,
                );
                Ok(KeyTerms::default())
            }
        }
    }
}
