//! Event types describing the life of a scrape task
//!
//! Every unit of work reports its stage transitions, discovered products and
//! failures as `ScrapeEvent`s to an injected sink.

use serde::{Deserialize, Serialize};

/// Per-task stage: `Pending -> Fetching -> Extracting -> Decoding -> {Merged | Failed}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStage {
    /// Spawned, waiting for a concurrency permit
    Pending,
    /// Page fetch in flight
    Fetching,
    /// Looking for the embedded bootstrap blob
    Extracting,
    /// Mapping the blob onto products
    Decoding,
    /// Products appended to the aggregate (terminal)
    Merged,
    /// Task contributed nothing (terminal)
    Failed,
}

impl TaskStage {
    /// Whether no further transition can follow
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Merged | Self::Failed)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetching => "fetching",
            Self::Extracting => "extracting",
            Self::Decoding => "decoding",
            Self::Merged => "merged",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for TaskStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of the task an event belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskLabel {
    pub task_id: String,
    pub locale: String,
    pub category: String,
    pub url: String,
}

/// Structured scrape event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScrapeEvent {
    /// A task moved to a new non-terminal stage
    StageEntered { task: TaskLabel, stage: TaskStage },
    /// A product was decoded
    ProductFound {
        task: TaskLabel,
        id: String,
        name: String,
    },
    /// Task finished and merged its products
    TaskMerged {
        task: TaskLabel,
        products_found: usize,
        duration_ms: u64,
    },
    /// Task failed at `stage`; it contributes no products
    TaskFailed {
        task: TaskLabel,
        stage: TaskStage,
        error: String,
        duration_ms: u64,
    },
}
