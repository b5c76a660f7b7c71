use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use redline_extract::{DecoderRegistry, ExtractError};
use redline_llm::CompletionProvider;
use redline_pipeline::{
    AnalysisEvent, Clause, ContractPipeline, EventSink, KeyTerms, PipelineConfig, PipelineError,
    ReportGenerator, ReportInput, RiskAssessment, RiskLevel,
};

#[derive(Clone)]
pub struct AppState {
    provider: Arc<dyn CompletionProvider>,
    decoders: Arc<DecoderRegistry>,
    config: PipelineConfig,
}

impl AppState {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            provider,
            decoders: Arc::new(DecoderRegistry::standard()),
            config: PipelineConfig::default(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/contracts/analyze", post(analyze_contract))
        .route("/api/reports/{id}", get(download_report))
        .with_state(state)
}

type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub filename: String,
    /// Base64-encoded document payload.
    pub document: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub id: String,
    pub filename: String,
    pub status: &'static str,
    pub extracted_clauses: Vec<Clause>,
    pub risk_summary: RiskAssessment,
    pub key_terms: KeyTerms,
    pub created_at: String,
}

async fn analyze_contract(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let document = BASE64
        .decode(request.document.as_bytes())
        .map_err(|_| error_response(StatusCode::BAD_REQUEST, "document is not valid base64"))?;

    let pipeline = ContractPipeline::new(
        Arc::clone(&state.provider),
        Arc::clone(&state.decoders),
        state.config.clone(),
        tracing_sink(),
    );
    let record = pipeline
        .analyze(Bytes::from(document), request.filename.clone())
        .await
        .map_err(|error| {
            tracing::error!(filename = %request.filename, %error, "contract analysis failed");
            analysis_error(&error)
        })?;

    Ok(Json(AnalysisResponse {
        id: record.analysis_id,
        filename: record.state.filename,
        status: "completed",
        extracted_clauses: record.state.clauses,
        risk_summary: record.state.risk_assessment,
        key_terms: record.state.key_terms,
        created_at: record.created_at,
    }))
}

/// Analyses are not persisted, so the report download regenerates a
/// placeholder from fixed sample data, labeled for PDF download; real PDF
/// rendering is an external collaborator.
async fn download_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let clauses = sample_clauses();
    let risk_assessment = sample_risk_assessment();
    let key_terms = sample_key_terms();

    let generator = ReportGenerator::new(Arc::clone(&state.provider), state.config.clone());
    let report = generator
        .generate(ReportInput {
            filename: "sample-contract.pdf",
            clauses: &clauses,
            risk_assessment: &risk_assessment,
            key_terms: &key_terms,
        })
        .await
        .map_err(|error| {
            tracing::error!(%id, %error, "report generation failed");
            analysis_error(&error)
        })?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"contract-analysis-report.pdf\"",
            ),
        ],
        report,
    ))
}

fn tracing_sink() -> EventSink {
    EventSink::with_observer(Arc::new(|event: &AnalysisEvent| {
        tracing::info!(
            sequence_no = event.sequence_no,
            timestamp = %event.timestamp,
            kind = ?event.kind,
            "analysis event"
        );
    }))
}

fn analysis_error(error: &PipelineError) -> ApiError {
    let status = match error {
        PipelineError::Extraction(ExtractError::UnsupportedFormat { .. }) => {
            StatusCode::BAD_REQUEST
        }
        PipelineError::Extraction(ExtractError::Malformed { .. }) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        PipelineError::Capability { .. } => StatusCode::BAD_GATEWAY,
    };
    error_response(status, &error.to_string())
}

fn error_response(status: StatusCode, message: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

fn sample_clauses() -> Vec<Clause> {
    vec![Clause {
        kind: "indemnity".to_string(),
        content: "Sample indemnity clause...".to_string(),
        risk_level: RiskLevel::Medium,
        analysis: "This clause has moderate risk...".to_string(),
    }]
}

fn sample_risk_assessment() -> RiskAssessment {
    RiskAssessment {
        overall_risk: RiskLevel::Medium,
        critical_issues: vec!["Sample critical issue".to_string()],
        recommendations: vec!["Sample recommendation".to_string()],
    }
}

fn sample_key_terms() -> KeyTerms {
    KeyTerms {
        parties: vec!["Party A".to_string(), "Party B".to_string()],
        effective_date: "2024-01-01".to_string(),
        termination_date: "2024-12-31".to_string(),
        payment_terms: "Net 30 days".to_string(),
        governing_law: "New York".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redline_llm::CapabilityError;

    #[test]
    fn analysis_error_maps_failure_classes_to_statuses() {
        let unsupported = PipelineError::Extraction(ExtractError::UnsupportedFormat {
            filename: "contract.txt".to_string(),
        });
        assert_eq!(analysis_error(&unsupported).0, StatusCode::BAD_REQUEST);

        let malformed = PipelineError::Extraction(ExtractError::Malformed {
            format: "pdf",
            reason: "truncated".to_string(),
        });
        assert_eq!(
            analysis_error(&malformed).0,
            StatusCode::UNPROCESSABLE_ENTITY
        );

        let capability = PipelineError::Capability {
            stage: redline_pipeline::Stage::RiskAnalyzer,
            source: CapabilityError::EmptyCompletion,
        };
        assert_eq!(analysis_error(&capability).0, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn analysis_response_serializes_with_wire_field_names() {
        let response = AnalysisResponse {
            id: "a-1".to_string(),
            filename: "contract.docx".to_string(),
            status: "completed",
            extracted_clauses: sample_clauses(),
            risk_summary: sample_risk_assessment(),
            key_terms: sample_key_terms(),
            created_at: "2026-08-07T00:00:00Z".to_string(),
        };

        let value = serde_json::to_value(&response).expect("response should serialize");
        assert_eq!(value["status"], "completed");
        assert_eq!(value["extractedClauses"][0]["type"], "indemnity");
        assert_eq!(value["riskSummary"]["overallRisk"], "medium");
        assert_eq!(value["keyTerms"]["governingLaw"], "New York");
        assert!(value.get("createdAt").is_some());
    }
}
