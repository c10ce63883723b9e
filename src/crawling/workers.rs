//! # Scrape Worker
//!
//! Runs one task through `fetch -> extract -> decode`. The worker knows
//! nothing about other tasks; aggregation and failure accounting belong to
//! the orchestrator.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::crawling::event_sink::ScrapeEventSink;
use crate::crawling::tasks::ScrapeTask;
use crate::domain::{Product, ScrapeEvent, TaskStage};
use crate::infrastructure::parsing::{
    BootstrapExtractor, ContextualParser, ParseContext, ParsingConfig, ParsingError,
    ProductGridParser,
};
use crate::infrastructure::simple_http_client::{FetchError, PageFetcher};

/// Per-task failure, tagged with the stage it happened in
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkerError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("extracting bootstrap: {0}")]
    Extract(ParsingError),

    #[error("decoding products: {0}")]
    Decode(ParsingError),

    #[error("Task timeout: fetching {url} took longer than {seconds}s")]
    Timeout { url: String, seconds: u64 },

    #[error("Task was cancelled")]
    Cancelled { stage: TaskStage },
}

impl WorkerError {
    /// Stage the task was in when it failed
    pub const fn stage(&self) -> TaskStage {
        match self {
            Self::Fetch(_) | Self::Timeout { .. } => TaskStage::Fetching,
            Self::Extract(_) => TaskStage::Extracting,
            Self::Decode(_) => TaskStage::Decoding,
            Self::Cancelled { stage } => *stage,
        }
    }
}

/// Stateless per-task pipeline shared by all spawned units
pub struct ScrapeWorker {
    fetcher: Arc<dyn PageFetcher>,
    extractor: BootstrapExtractor,
    parser: ProductGridParser,
    fetch_timeout: Duration,
}

impl ScrapeWorker {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        parsing: &ParsingConfig,
        fetch_timeout: Duration,
    ) -> Result<Self, ParsingError> {
        Ok(Self {
            fetcher,
            extractor: BootstrapExtractor::with_config(parsing)?,
            parser: ProductGridParser::with_config(parsing),
            fetch_timeout,
        })
    }

    /// Run `task` to completion, reporting stage transitions to `sink`
    pub async fn process(
        &self,
        task: &ScrapeTask,
        sink: &dyn ScrapeEventSink,
        cancel: &CancellationToken,
    ) -> Result<Vec<Product>, WorkerError> {
        let label = task.label();

        sink.emit(ScrapeEvent::StageEntered {
            task: label.clone(),
            stage: TaskStage::Fetching,
        });
        let body = self.fetch(&task.url, cancel).await?;

        sink.emit(ScrapeEvent::StageEntered {
            task: label.clone(),
            stage: TaskStage::Extracting,
        });
        let fragment = self.extractor.extract(&body).map_err(WorkerError::Extract)?;
        drop(body);

        sink.emit(ScrapeEvent::StageEntered {
            task: label.clone(),
            stage: TaskStage::Decoding,
        });
        let context = ParseContext::new(task.locale.as_str(), task.category.as_str())
            .with_source_url(task.url.as_str());
        let products = self
            .parser
            .parse_with_context(&fragment, &context)
            .map_err(WorkerError::Decode)?;

        for product in &products {
            sink.emit(ScrapeEvent::ProductFound {
                task: label.clone(),
                id: product.id().to_string(),
                name: product.name().to_string(),
            });
        }

        Ok(products)
    }

    async fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<Vec<u8>, WorkerError> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(WorkerError::Cancelled { stage: TaskStage::Fetching }),
            result = tokio::time::timeout(self.fetch_timeout, self.fetcher.get(url)) => match result {
                Ok(body) => Ok(body?),
                Err(_) => Err(WorkerError::Timeout {
                    url: url.to_string(),
                    seconds: self.fetch_timeout.as_secs(),
                }),
            },
        }
    }
}
