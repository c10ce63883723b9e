//! Event sinks for scrape progress
//!
//! Workers and the orchestrator never log task outcomes directly; they emit
//! [`ScrapeEvent`]s into whatever sink they were constructed with.

use std::sync::Mutex;
use tracing::{debug, error, info};

use crate::domain::{ScrapeEvent, TaskStage};

/// Receiver of scrape events; must not block
pub trait ScrapeEventSink: Send + Sync {
    fn emit(&self, event: ScrapeEvent);
}

/// Writes events to `tracing` with the task identity as fields
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl ScrapeEventSink for TracingEventSink {
    fn emit(&self, event: ScrapeEvent) {
        match &event {
            ScrapeEvent::StageEntered { task, stage } => {
                debug!(
                    task_id = %task.task_id,
                    locale = %task.locale,
                    category = %task.category,
                    "➡️ {} {}",
                    stage,
                    task.url
                );
            }
            ScrapeEvent::ProductFound { task, id, name } => {
                debug!(
                    locale = %task.locale,
                    category = %task.category,
                    id = %id,
                    name = %name,
                    "🔍 product found"
                );
            }
            ScrapeEvent::TaskMerged {
                task,
                products_found,
                duration_ms,
            } => {
                info!(
                    locale = %task.locale,
                    category = %task.category,
                    products_found,
                    duration_ms,
                    "✅ Scraped {}",
                    task.url
                );
            }
            ScrapeEvent::TaskFailed {
                task,
                stage,
                error,
                duration_ms,
            } => {
                let what = match stage {
                    TaskStage::Fetching => "getting products html",
                    TaskStage::Extracting => "extracting products json",
                    TaskStage::Decoding => "unmarshalling products json",
                    _ => "scheduling task",
                };
                error!(
                    locale = %task.locale,
                    category = %task.category,
                    url = %task.url,
                    duration_ms,
                    "❌ {}: {}",
                    what,
                    error
                );
            }
        }
    }
}

/// Keeps every event in memory, in emission order
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<ScrapeEvent>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events received so far
    pub fn events(&self) -> Vec<ScrapeEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl ScrapeEventSink for RecordingEventSink {
    fn emit(&self, event: ScrapeEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
