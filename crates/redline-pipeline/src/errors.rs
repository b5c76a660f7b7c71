use serde::{Deserialize, Serialize};
use thiserror::Error;

use redline_extract::ExtractError;
use redline_llm::CapabilityError;

/// One of the four ordered steps of the analysis pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    DocumentProcessor,
    ClauseExtractor,
    RiskAnalyzer,
    ReportGenerator,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DocumentProcessor => "document_processor",
            Self::ClauseExtractor => "clause_extractor",
            Self::RiskAnalyzer => "risk_analyzer",
            Self::ReportGenerator => "report_generator",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fatal errors for one contract analysis.
///
/// Malformed capability output never appears here: every stage that can
/// receive structured output absorbs a parse miss into its documented
/// fallback value. Only unsupported formats, undecodable documents and
/// capability call failures abort the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Extraction(#[from] ExtractError),
    #[error("{stage} capability call failed: {source}")]
    Capability {
        stage: Stage,
        #[source]
        source: CapabilityError,
    },
}

impl PipelineError {
    pub(crate) fn capability(stage: Stage, source: CapabilityError) -> Self {
        Self::Capability { stage, source }
    }
}
