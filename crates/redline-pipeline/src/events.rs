use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::errors::Stage;

/// Structured diagnostic record emitted while an analysis runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisEvent {
    pub sequence_no: u64,
    pub timestamp: String,
    pub kind: AnalysisEventKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum AnalysisEventKind {
    Pipeline(PipelineEvent),
    Stage(StageEvent),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineEvent {
    Started {
        analysis_id: String,
        filename: String,
    },
    Completed {
        analysis_id: String,
        clause_count: usize,
        overall_risk: String,
    },
    Failed {
        analysis_id: String,
        reason: String,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageEvent {
    Started {
        analysis_id: String,
        stage: Stage,
    },
    Completed {
        analysis_id: String,
        stage: Stage,
    },
    /// Malformed capability output was absorbed into the documented fallback
    /// value for this call.
    FallbackApplied {
        analysis_id: String,
        stage: Stage,
        call: String,
        reason: String,
    },
}

pub trait AnalysisEventObserver: Send + Sync {
    fn on_event(&self, event: &AnalysisEvent);
}

impl<F> AnalysisEventObserver for F
where
    F: Fn(&AnalysisEvent) + Send + Sync,
{
    fn on_event(&self, event: &AnalysisEvent) {
        self(event);
    }
}

pub type SharedAnalysisEventObserver = Arc<dyn AnalysisEventObserver>;
pub type AnalysisEventSender = mpsc::UnboundedSender<AnalysisEvent>;
pub type AnalysisEventReceiver = mpsc::UnboundedReceiver<AnalysisEvent>;

#[derive(Clone, Default)]
pub struct EventSink {
    observer: Option<SharedAnalysisEventObserver>,
    sender: Option<AnalysisEventSender>,
}

impl EventSink {
    pub fn with_observer(observer: SharedAnalysisEventObserver) -> Self {
        Self {
            observer: Some(observer),
            sender: None,
        }
    }

    pub fn with_sender(sender: AnalysisEventSender) -> Self {
        Self {
            observer: None,
            sender: Some(sender),
        }
    }

    pub fn observer(mut self, observer: SharedAnalysisEventObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn sender(mut self, sender: AnalysisEventSender) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.observer.is_some() || self.sender.is_some()
    }

    pub fn emit(&self, event: AnalysisEvent) {
        if let Some(observer) = self.observer.as_ref() {
            observer.on_event(&event);
        }
        if let Some(sender) = self.sender.as_ref() {
            let _ = sender.send(event);
        }
    }
}

pub fn analysis_event_channel() -> (AnalysisEventSender, AnalysisEventReceiver) {
    mpsc::unbounded_channel()
}

/// Sequence-stamping wrapper shared by the pipeline and its stages.
#[derive(Clone, Default)]
pub struct EventEmitter {
    sink: EventSink,
    sequence: Arc<AtomicU64>,
}

impl EventEmitter {
    pub fn new(sink: EventSink) -> Self {
        Self {
            sink,
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_enabled()
    }

    pub fn emit(&self, kind: AnalysisEventKind) {
        if !self.sink.is_enabled() {
            return;
        }
        let event = AnalysisEvent {
            sequence_no: self.sequence.fetch_add(1, Ordering::Relaxed),
            timestamp: chrono::Utc::now().to_rfc3339(),
            kind,
        };
        self.sink.emit(event);
    }

    pub(crate) fn fallback(&self, analysis_id: &str, stage: Stage, call: &str, reason: &str) {
        self.emit(AnalysisEventKind::Stage(StageEvent::FallbackApplied {
            analysis_id: analysis_id.to_string(),
            stage,
            call: call.to_string(),
            reason: reason.to_string(),
        }));
    }
}
