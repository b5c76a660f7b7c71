use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{ArgAction, Parser, Subcommand};

use redline_extract::DecoderRegistry;
use redline_pipeline::{
    AnalysisEvent, AnalysisEventKind, AnalysisRecord, ContractPipeline, EventSink, PipelineConfig,
    PipelineEvent, StageEvent, analysis_event_channel,
};

#[derive(Parser, Debug)]
#[command(name = "redline")]
#[command(about = "Contract-review analysis pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a contract and print the structured findings.
    Analyze(AnalyzeArgs),
    /// Analyze a contract and print the narrative report.
    Report(ReportArgs),
}

#[derive(clap::Args, Debug)]
struct AnalyzeArgs {
    #[arg(long)]
    file: PathBuf,
    #[arg(long)]
    model: Option<String>,
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
    #[arg(long = "no-stream-events", action = ArgAction::SetTrue)]
    no_stream_events: bool,
    #[arg(long, action = ArgAction::SetTrue)]
    event_json: bool,
}

#[derive(clap::Args, Debug)]
struct ReportArgs {
    #[arg(long)]
    file: PathBuf,
    #[arg(long)]
    model: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Analyze(args) => analyze_command(args).await,
        Commands::Report(args) => report_command(args).await,
    };

    match result {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(1)
        }
    }
}

async fn analyze_command(args: AnalyzeArgs) -> Result<ExitCode, String> {
    let (document, filename) = load_document(&args.file)?;

    let (event_sink, event_task) = event_stream(!args.no_stream_events, args.event_json);
    let pipeline = build_pipeline(args.model, event_sink)?;
    let record = pipeline
        .analyze(document.into(), filename)
        .await
        .map_err(|error| error.to_string())?;
    drop(pipeline);

    if let Some(task) = event_task {
        task.await.map_err(|error| error.to_string())?;
    }

    if args.json {
        let analysis = analysis_json(&record);
        println!(
            "{}",
            serde_json::to_string_pretty(&analysis).map_err(|error| error.to_string())?
        );
    } else {
        print_analysis_summary(&record);
    }
    Ok(ExitCode::SUCCESS)
}

async fn report_command(args: ReportArgs) -> Result<ExitCode, String> {
    let (document, filename) = load_document(&args.file)?;

    let pipeline = build_pipeline(args.model, EventSink::default())?;
    let record = pipeline
        .analyze(document.into(), filename)
        .await
        .map_err(|error| error.to_string())?;

    println!("{}", record.state.report);
    Ok(ExitCode::SUCCESS)
}

fn load_document(path: &Path) -> Result<(Vec<u8>, String), String> {
    let document = std::fs::read(path)
        .map_err(|error| format!("failed reading '{}': {error}", path.display()))?;
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| format!("'{}' has no usable file name", path.display()))?
        .to_string();
    Ok((document, filename))
}

fn build_pipeline(
    model_override: Option<String>,
    event_sink: EventSink,
) -> Result<ContractPipeline, String> {
    let provider = redline_llm::provider_from_env()
        .map_err(|error| error.to_string())?
        .ok_or_else(|| "OPENAI_API_KEY is not set".to_string())?;

    let mut config = PipelineConfig::default();
    if let Ok(model) = std::env::var("OPENAI_MODEL") {
        config.model = model;
    }
    if let Some(model) = model_override {
        config.model = model;
    }

    Ok(ContractPipeline::new(
        provider,
        Arc::new(DecoderRegistry::standard()),
        config,
        event_sink,
    ))
}

fn event_stream(
    stream_events: bool,
    event_json: bool,
) -> (EventSink, Option<tokio::task::JoinHandle<()>>) {
    if !stream_events {
        return (EventSink::default(), None);
    }

    let (tx, mut rx) = analysis_event_channel();
    let task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if event_json {
                match serde_json::to_string(&event) {
                    Ok(line) => println!("{line}"),
                    Err(_) => print_event_text(&event),
                }
            } else {
                print_event_text(&event);
            }
        }
    });
    (EventSink::with_sender(tx), Some(task))
}

fn print_event_text(event: &AnalysisEvent) {
    println!(
        "[event seq={}] {} {}",
        event.sequence_no,
        event.timestamp,
        event_label(&event.kind)
    );
}

fn event_label(kind: &AnalysisEventKind) -> String {
    match kind {
        AnalysisEventKind::Pipeline(PipelineEvent::Started { filename, .. }) => {
            format!("pipeline started ({filename})")
        }
        AnalysisEventKind::Pipeline(PipelineEvent::Completed {
            clause_count,
            overall_risk,
            ..
        }) => format!("pipeline completed ({clause_count} clauses, {overall_risk} overall risk)"),
        AnalysisEventKind::Pipeline(PipelineEvent::Failed { reason, .. }) => {
            format!("pipeline failed: {reason}")
        }
        AnalysisEventKind::Stage(StageEvent::Started { stage, .. }) => {
            format!("{stage} started")
        }
        AnalysisEventKind::Stage(StageEvent::Completed { stage, .. }) => {
            format!("{stage} completed")
        }
        AnalysisEventKind::Stage(StageEvent::FallbackApplied {
            stage,
            call,
            reason,
            ..
        }) => format!("{stage} fallback applied ({call}): {reason}"),
    }
}

fn analysis_json(record: &AnalysisRecord) -> serde_json::Value {
    serde_json::json!({
        "id": record.analysis_id,
        "filename": record.state.filename,
        "status": "completed",
        "extractedClauses": record.state.clauses,
        "riskSummary": record.state.risk_assessment,
        "keyTerms": record.state.key_terms,
        "createdAt": record.created_at,
    })
}

fn print_analysis_summary(record: &AnalysisRecord) {
    println!("analysis_id: {}", record.analysis_id);
    println!("filename: {}", record.state.filename);
    println!("sections: {}", record.state.sections.len());
    println!(
        "overall_risk: {}",
        record.state.risk_assessment.overall_risk
    );
    println!("clauses: {}", record.state.clauses.len());
    for clause in &record.state.clauses {
        println!("  [{}] {}: {}", clause.risk_level, clause.kind, clause.analysis);
    }
    if !record.state.risk_assessment.critical_issues.is_empty() {
        println!("critical_issues:");
        for issue in &record.state.risk_assessment.critical_issues {
            println!("  - {issue}");
        }
    }
    if !record.state.risk_assessment.recommendations.is_empty() {
        println!("recommendations:");
        for recommendation in &record.state.risk_assessment.recommendations {
            println!("  - {recommendation}");
        }
    }
}
