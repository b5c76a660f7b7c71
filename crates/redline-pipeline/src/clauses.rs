use std::collections::HashSet;
use std::sync::Arc;

use redline_llm::{CompletionProvider, CompletionRequest};

use crate::config::PipelineConfig;
use crate::errors::{PipelineError, Stage};
use crate::events::EventEmitter;
use crate::parse;
use crate::prompts;
use crate::state::{Clause, Section};

/// Characters of clause content that participate in the dedup key.
const DEDUP_PREFIX_CHARS: usize = 100;

/// Stage two: scan each section, then the capped full text, for legally
/// meaningful clauses; deduplicate the combined results.
pub struct ClauseExtractor {
    provider: Arc<dyn CompletionProvider>,
    config: PipelineConfig,
    events: EventEmitter,
}

impl ClauseExtractor {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        config: PipelineConfig,
        events: EventEmitter,
    ) -> Self {
        Self {
            provider,
            config,
            events,
        }
    }

    /// The per-section passes run first, in section order, then the full-text
    /// pass; first occurrence wins in deduplication, so that order is load
    /// bearing.
    pub async fn extract(
        &self,
        analysis_id: &str,
        full_text: &str,
        sections: &[Section],
    ) -> Result<Vec<Clause>, PipelineError> {
        let mut clauses = Vec::new();
        for section in sections {
            clauses.extend(
                self.extract_from_section(analysis_id, &section.content, &section.kind)
                    .await?,
            );
        }
        clauses.extend(self.extract_from_full_text(analysis_id, full_text).await?);
        Ok(dedup_clauses(clauses))
    }

    async fn extract_from_section(
        &self,
        analysis_id: &str,
        content: &str,
        section_kind: &str,
    ) -> Result<Vec<Clause>, PipelineError> {
        let request = self.config.request(
            prompts::section_clauses_system(),
            prompts::section_clauses_prompt(content, section_kind),
        );
        self.clause_pass(analysis_id, request, "section_clauses").await
    }

    async fn extract_from_full_text(
        &self,
        analysis_id: &str,
        text: &str,
    ) -> Result<Vec<Clause>, PipelineError> {
        let request = self.config.request(
            prompts::full_text_clauses_system(),
            prompts::full_text_clauses_prompt(self.config.capped(text)),
        );
        self.clause_pass(analysis_id, request, "full_text_clauses")
            .await
    }

    async fn clause_pass(
        &self,
        analysis_id: &str,
        request: CompletionRequest,
        call: &str,
    ) -> Result<Vec<Clause>, PipelineError> {
        let completion = self
            .provider
            .complete(request)
            .await
            .map_err(|source| PipelineError::capability(Stage::ClauseExtractor, source))?;

        match parse::structured::<Vec<Clause>>(&completion.text) {
            Ok(clauses) => Ok(clauses),
            Err(error) => {
                self.events
                    .fallback(analysis_id, Stage::ClauseExtractor, call, &error.reason);
                Ok(Vec::new())
            }
        }
    }
}

/// Drop repeated clauses, keyed by type plus the first 100 characters of the
/// clause text. The first occurrence wins and input order is preserved.
/// Same-type clauses that agree on that prefix collapse to one entry even if
/// they diverge later.
pub fn dedup_clauses(clauses: Vec<Clause>) -> Vec<Clause> {
    let mut seen = HashSet::new();
    clauses
        .into_iter()
        .filter(|clause| seen.insert(dedup_key(clause)))
        .collect()
}

fn dedup_key(clause: &Clause) -> (String, String) {
    (
        clause.kind.clone(),
        clause.content.chars().take(DEDUP_PREFIX_CHARS).collect(),
    )
}
