//! # Crawling Module
//!
//! Task enumeration, the per-task worker pipeline and the orchestrator that
//! fans tasks out and merges their products.

pub mod event_sink;
pub mod orchestrator;
pub mod tasks;
pub mod workers;

pub use event_sink::{RecordingEventSink, ScrapeEventSink, TracingEventSink};
pub use orchestrator::{
    OrchestratorConfig, OrchestratorError, ScrapeOrchestrator, ScrapeReport, TaskFailure,
};
pub use tasks::{ScrapeTask, TaskId, TaskSource};
pub use workers::{ScrapeWorker, WorkerError};
