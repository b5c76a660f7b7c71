mod support;

use std::sync::Arc;

use bytes::Bytes;

use redline_extract::ExtractError;
use redline_llm::{CapabilityError, CompletionProvider};
use redline_pipeline::{
    AnalysisEventKind, ContractPipeline, EventSink, KeyTerms, PipelineConfig, PipelineError,
    PipelineEvent, RiskAssessment, RiskLevel, Section, StageEvent,
};

use support::{SequenceProvider, capture_sink, docx_stub_registry};

const CONTRACT_TEXT: &str = "The Supplier shall indemnify the Customer without limit. \
General provisions apply to both parties.";

fn pipeline(provider: &Arc<SequenceProvider>, text: &str, sink: EventSink) -> ContractPipeline {
    ContractPipeline::new(
        Arc::clone(provider) as Arc<dyn CompletionProvider>,
        docx_stub_registry(text),
        PipelineConfig::default(),
        sink,
    )
}

fn queue_full_run(provider: &SequenceProvider) {
    // Document processor: sections, then key terms.
    provider.push_text(
        r#"[
            {"title":"Indemnification","content":"The Supplier shall indemnify the Customer without limit.","type":"indemnity"},
            {"title":"General","content":"General provisions apply to both parties.","type":"general"}
        ]"#,
    );
    provider.push_text(
        r#"{"parties":["Supplier","Customer"],"effectiveDate":"2026-01-01","terminationDate":"Not specified","paymentTerms":"Not specified","governingLaw":"England"}"#,
    );
    // Clause extractor: one pass per section, then the full-text pass. The
    // full-text pass repeats the indemnity clause and finds a new one.
    provider.push_text(
        r#"[{"type":"indemnity","content":"The Supplier shall indemnify the Customer without limit.","riskLevel":"high","analysis":"Uncapped indemnity favors the Customer."}]"#,
    );
    provider.push_text("[]");
    provider.push_text(
        r#"[
            {"type":"indemnity","content":"The Supplier shall indemnify the Customer without limit.","riskLevel":"high","analysis":"Duplicate finding."},
            {"type":"confidentiality","content":"Each party shall keep terms confidential.","riskLevel":"medium","analysis":"No survival period stated."}
        ]"#,
    );
    // Risk analyzer: factors, structural, synthesis.
    provider.push_text(r#"["Unlimited indemnity exposure"]"#);
    provider.push_text(
        r#"{"missingClauses":["payment_terms"],"imbalancedTerms":["indemnity"],"structuralIssues":[]}"#,
    );
    provider.push_text(
        r#"{"overallRisk":"high","criticalIssues":["Indemnity is uncapped","No payment terms"],"recommendations":["Negotiate an indemnity cap"]}"#,
    );
    // Report generator.
    provider.push_text("Contract Analysis Report\n\nExecutive Summary: high risk.");
}

#[tokio::test(flavor = "current_thread")]
async fn analyze_docx_expected_fully_populated_state() {
    let provider = Arc::new(SequenceProvider::new());
    queue_full_run(&provider);
    let (sink, events) = capture_sink();

    let record = pipeline(&provider, CONTRACT_TEXT, sink)
        .analyze(Bytes::from_static(b"raw bytes"), "contract.docx")
        .await
        .expect("analysis should succeed");

    assert!(!record.analysis_id.is_empty());
    assert_eq!(record.state.filename, "contract.docx");
    assert_eq!(record.state.extracted_text, CONTRACT_TEXT);
    assert_eq!(record.state.sections.len(), 2);
    assert_eq!(record.state.key_terms.governing_law, "England");

    // Duplicate indemnity clause from the full-text pass is dropped; the
    // section-pass occurrence (first seen) survives, order preserved.
    let kinds: Vec<&str> = record
        .state
        .clauses
        .iter()
        .map(|clause| clause.kind.as_str())
        .collect();
    assert_eq!(kinds, vec!["indemnity", "confidentiality"]);
    assert_eq!(
        record.state.clauses[0].analysis,
        "Uncapped indemnity favors the Customer."
    );

    assert_eq!(record.state.risk_assessment.overall_risk, RiskLevel::High);
    assert!(record.state.report.starts_with("Contract Analysis Report"));

    // Nine capability calls: 2 processor, 3 extractor, 3 analyzer, 1 report.
    assert_eq!(provider.recorded_requests().len(), 9);

    let events = events.lock().expect("events mutex");
    let labels: Vec<String> = events
        .iter()
        .map(|event| match &event.kind {
            AnalysisEventKind::Pipeline(PipelineEvent::Started { .. }) => "pipeline_started".into(),
            AnalysisEventKind::Pipeline(PipelineEvent::Completed { .. }) => {
                "pipeline_completed".into()
            }
            AnalysisEventKind::Pipeline(PipelineEvent::Failed { .. }) => "pipeline_failed".into(),
            AnalysisEventKind::Stage(StageEvent::Started { stage, .. }) => {
                format!("{stage}_started")
            }
            AnalysisEventKind::Stage(StageEvent::Completed { stage, .. }) => {
                format!("{stage}_completed")
            }
            AnalysisEventKind::Stage(StageEvent::FallbackApplied { call, .. }) => {
                format!("fallback_{call}")
            }
        })
        .collect();
    assert_eq!(
        labels,
        vec![
            "pipeline_started",
            "document_processor_started",
            "document_processor_completed",
            "clause_extractor_started",
            "clause_extractor_completed",
            "risk_analyzer_started",
            "risk_analyzer_completed",
            "report_generator_started",
            "report_generator_completed",
            "pipeline_completed",
        ]
    );
}

#[tokio::test(flavor = "current_thread")]
async fn high_risk_clause_and_missing_payment_terms_expected_elevated_verdict() {
    let provider = Arc::new(SequenceProvider::new());
    queue_full_run(&provider);

    let record = pipeline(&provider, CONTRACT_TEXT, EventSink::default())
        .analyze(Bytes::from_static(b"raw bytes"), "two-page.docx")
        .await
        .expect("analysis should succeed");

    assert!(record.state.risk_assessment.overall_risk >= RiskLevel::Medium);
    assert!(!record.state.risk_assessment.critical_issues.is_empty());
    assert!(
        !record
            .state
            .clauses
            .iter()
            .any(|clause| clause.kind == "payment_terms")
    );
}

#[tokio::test(flavor = "current_thread")]
async fn unsupported_extension_expected_no_stage_runs() {
    let provider = Arc::new(SequenceProvider::new());
    let (sink, events) = capture_sink();

    let error = pipeline(&provider, CONTRACT_TEXT, sink)
        .analyze(Bytes::from_static(b"raw bytes"), "contract.txt")
        .await
        .expect_err("txt should not analyze");

    assert!(matches!(
        error,
        PipelineError::Extraction(ExtractError::UnsupportedFormat { filename }) if filename == "contract.txt"
    ));
    assert!(provider.recorded_requests().is_empty());

    let events = events.lock().expect("events mutex");
    assert!(events.iter().any(|event| matches!(
        &event.kind,
        AnalysisEventKind::Pipeline(PipelineEvent::Failed { .. })
    )));
}

#[tokio::test(flavor = "current_thread")]
async fn empty_document_with_malformed_outputs_expected_documented_fallbacks() {
    let provider = Arc::new(SequenceProvider::new());
    // Every structured call returns unparseable text; only the report, which
    // is prose by contract, succeeds.
    for _ in 0..7 {
        provider.push_text("I'm sorry, I can't help with that.");
    }
    provider.push_text("Fallback-era analysis report.");
    let (sink, events) = capture_sink();

    let record = pipeline(&provider, "", sink)
        .analyze(Bytes::new(), "empty.docx")
        .await
        .expect("fallbacks should absorb every parse miss");

    assert_eq!(
        record.state.sections,
        vec![Section {
            title: "Full Document".to_string(),
            content: String::new(),
            kind: "general".to_string(),
        }]
    );
    assert_eq!(record.state.key_terms, KeyTerms::default());
    assert!(record.state.clauses.is_empty());
    assert_eq!(record.state.risk_assessment, RiskAssessment::incomplete());
    assert_eq!(record.state.report, "Fallback-era analysis report.");

    // sections, key terms, one section pass, full-text pass, risk factors,
    // structural risks, synthesis: seven absorbed misses.
    let events = events.lock().expect("events mutex");
    let fallback_calls: Vec<&str> = events
        .iter()
        .filter_map(|event| match &event.kind {
            AnalysisEventKind::Stage(StageEvent::FallbackApplied { call, .. }) => {
                Some(call.as_str())
            }
            _ => None,
        })
        .collect();
    assert_eq!(
        fallback_calls,
        vec![
            "section_split",
            "key_terms",
            "section_clauses",
            "full_text_clauses",
            "risk_factors",
            "structural_risks",
            "overall_assessment",
        ]
    );
}

#[tokio::test(flavor = "current_thread")]
async fn capability_call_failure_expected_fatal_and_no_partial_result() {
    let provider = Arc::new(SequenceProvider::new());
    provider.push_text(r#"[{"title":"A","content":"a","type":"general"}]"#);
    provider.push_error(CapabilityError::Api {
        status: 503,
        message: "overloaded".to_string(),
    });
    let (sink, events) = capture_sink();

    let error = pipeline(&provider, CONTRACT_TEXT, sink)
        .analyze(Bytes::from_static(b"raw bytes"), "contract.docx")
        .await
        .expect_err("call failure should abort the analysis");

    assert!(matches!(
        error,
        PipelineError::Capability {
            stage: redline_pipeline::Stage::DocumentProcessor,
            ..
        }
    ));
    // The pipeline stopped inside stage one: no extractor or analyzer calls.
    assert_eq!(provider.recorded_requests().len(), 2);

    let events = events.lock().expect("events mutex");
    let failed = events.iter().any(|event| matches!(
        &event.kind,
        AnalysisEventKind::Pipeline(PipelineEvent::Failed { reason, .. }) if reason.contains("503")
    ));
    assert!(failed);
}
