use std::sync::Arc;

use bytes::Bytes;
use uuid::Uuid;

use redline_extract::DecoderRegistry;
use redline_llm::CompletionProvider;

use crate::clauses::ClauseExtractor;
use crate::config::PipelineConfig;
use crate::errors::{PipelineError, Stage};
use crate::events::{AnalysisEventKind, EventEmitter, EventSink, PipelineEvent, StageEvent};
use crate::processor::DocumentProcessor;
use crate::report::{ReportGenerator, ReportInput};
use crate::risk::RiskAnalyzer;
use crate::state::ContractState;

/// One completed analysis: the identifier minted at request entry, the entry
/// timestamp, and the fully populated state.
#[derive(Clone, Debug)]
pub struct AnalysisRecord {
    pub analysis_id: String,
    pub created_at: String,
    pub state: ContractState,
}

/// The four analysis stages, run strictly in order as plain sequential calls.
///
/// Each stage awaits the previous stage's full completion; the accumulated
/// [`ContractState`] is the only thing passed between them. One pipeline value
/// can serve many analyses, but each analysis owns its own state.
pub struct ContractPipeline {
    processor: DocumentProcessor,
    extractor: ClauseExtractor,
    analyzer: RiskAnalyzer,
    reporter: ReportGenerator,
    events: EventEmitter,
}

impl ContractPipeline {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        decoders: Arc<DecoderRegistry>,
        config: PipelineConfig,
        sink: EventSink,
    ) -> Self {
        let events = EventEmitter::new(sink);
        Self {
            processor: DocumentProcessor::new(
                Arc::clone(&provider),
                decoders,
                config.clone(),
                events.clone(),
            ),
            extractor: ClauseExtractor::new(Arc::clone(&provider), config.clone(), events.clone()),
            analyzer: RiskAnalyzer::new(Arc::clone(&provider), config.clone(), events.clone()),
            reporter: ReportGenerator::new(provider, config),
            events,
        }
    }

    /// Analyze one document. Returns either a fully populated record or a
    /// single fatal error; a failed analysis never yields partial results.
    pub async fn analyze(
        &self,
        document: Bytes,
        filename: impl Into<String>,
    ) -> Result<AnalysisRecord, PipelineError> {
        let filename = filename.into();
        let analysis_id = Uuid::new_v4().to_string();
        let created_at = chrono::Utc::now().to_rfc3339();

        self.events
            .emit(AnalysisEventKind::Pipeline(PipelineEvent::Started {
                analysis_id: analysis_id.clone(),
                filename: filename.clone(),
            }));

        match self.run_stages(&analysis_id, document, filename).await {
            Ok(state) => {
                self.events
                    .emit(AnalysisEventKind::Pipeline(PipelineEvent::Completed {
                        analysis_id: analysis_id.clone(),
                        clause_count: state.clauses.len(),
                        overall_risk: state.risk_assessment.overall_risk.to_string(),
                    }));
                Ok(AnalysisRecord {
                    analysis_id,
                    created_at,
                    state,
                })
            }
            Err(error) => {
                self.events
                    .emit(AnalysisEventKind::Pipeline(PipelineEvent::Failed {
                        analysis_id,
                        reason: error.to_string(),
                    }));
                Err(error)
            }
        }
    }

    async fn run_stages(
        &self,
        analysis_id: &str,
        document: Bytes,
        filename: String,
    ) -> Result<ContractState, PipelineError> {
        let mut state = ContractState::new(document, filename);

        self.stage_started(analysis_id, Stage::DocumentProcessor);
        let processed = self
            .processor
            .process(analysis_id, &state.document, &state.filename)
            .await?;
        state.extracted_text = processed.text;
        state.sections = processed.sections;
        state.key_terms = processed.key_terms;
        self.stage_completed(analysis_id, Stage::DocumentProcessor);

        self.stage_started(analysis_id, Stage::ClauseExtractor);
        state.clauses = self
            .extractor
            .extract(analysis_id, &state.extracted_text, &state.sections)
            .await?;
        self.stage_completed(analysis_id, Stage::ClauseExtractor);

        self.stage_started(analysis_id, Stage::RiskAnalyzer);
        state.risk_assessment = self
            .analyzer
            .analyze(analysis_id, &state.clauses, &state.key_terms)
            .await?;
        self.stage_completed(analysis_id, Stage::RiskAnalyzer);

        self.stage_started(analysis_id, Stage::ReportGenerator);
        state.report = self
            .reporter
            .generate(ReportInput {
                filename: &state.filename,
                clauses: &state.clauses,
                risk_assessment: &state.risk_assessment,
                key_terms: &state.key_terms,
            })
            .await?;
        self.stage_completed(analysis_id, Stage::ReportGenerator);

        Ok(state)
    }

    fn stage_started(&self, analysis_id: &str, stage: Stage) {
        self.events
            .emit(AnalysisEventKind::Stage(StageEvent::Started {
                analysis_id: analysis_id.to_string(),
                stage,
            }));
    }

    fn stage_completed(&self, analysis_id: &str, stage: Stage) {
        self.events
            .emit(AnalysisEventKind::Stage(StageEvent::Completed {
                analysis_id: analysis_id.to_string(),
                stage,
            }));
    }
}
