use std::sync::Arc;

use redline_llm::CompletionProvider;

use crate::config::PipelineConfig;
use crate::errors::{PipelineError, Stage};
use crate::prompts;
use crate::state::{Clause, KeyTerms, RiskAssessment};

/// Stage four: render a narrative report from the accumulated findings.
///
/// The completion is prose, not structured data, so this stage has no parse
/// branch; a capability call failure propagates.
pub struct ReportGenerator {
    provider: Arc<dyn CompletionProvider>,
    config: PipelineConfig,
}

pub struct ReportInput<'a> {
    pub filename: &'a str,
    pub clauses: &'a [Clause],
    pub risk_assessment: &'a RiskAssessment,
    pub key_terms: &'a KeyTerms,
}

impl ReportGenerator {
    pub fn new(provider: Arc<dyn CompletionProvider>, config: PipelineConfig) -> Self {
        Self { provider, config }
    }

    pub async fn generate(&self, input: ReportInput<'_>) -> Result<String, PipelineError> {
        let request = self.config.request(
            prompts::REPORT_SYSTEM,
            prompts::report_prompt(
                input.filename,
                input.clauses,
                input.risk_assessment.overall_risk,
                &input.risk_assessment.critical_issues,
                &input.risk_assessment.recommendations,
                input.key_terms,
            ),
        );
        let completion = self
            .provider
            .complete(request)
            .await
            .map_err(|source| PipelineError::capability(Stage::ReportGenerator, source))?;
        Ok(completion.text)
    }
}
