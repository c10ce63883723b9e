//! # Scrape Orchestrator
//!
//! Spawns one unit of work per task, bounds in-flight fetches with a
//! semaphore, and appends each successful task's products to a shared
//! aggregate under a mutex. A failed task contributes nothing and never
//! affects the others. `run` returns only after every spawned unit has
//! finished.

use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{Mutex, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::crawling::event_sink::ScrapeEventSink;
use crate::crawling::tasks::{ScrapeTask, TaskSource, enumerate, from_urls};
use crate::crawling::workers::{ScrapeWorker, WorkerError};
use crate::domain::{Product, ScrapeEvent, TaskLabel, TaskStage};
use crate::infrastructure::config::{ScraperConfig, defaults};
use crate::infrastructure::parsing::{ParsingConfig, ParsingError};
use crate::infrastructure::simple_http_client::PageFetcher;

/// Configuration for the orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Maximum number of fetches in flight
    pub max_concurrent: usize,

    /// Deadline for a single page fetch
    pub fetch_timeout: Duration,

    pub parsing: ParsingConfig,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_concurrent: defaults::MAX_CONCURRENT_REQUESTS,
            fetch_timeout: Duration::from_secs(defaults::FETCH_TIMEOUT_SECONDS),
            parsing: ParsingConfig::default(),
        }
    }
}

impl OrchestratorConfig {
    pub fn from_scraper_config(scraper: &ScraperConfig) -> Self {
        Self {
            max_concurrent: scraper.max_concurrent_requests,
            fetch_timeout: Duration::from_secs(scraper.fetch_timeout_seconds),
            parsing: scraper.parsing_config(),
        }
    }
}

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Parsing(#[from] ParsingError),
}

/// One task that contributed nothing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFailure {
    pub task: TaskLabel,
    pub stage: TaskStage,
    pub error: String,
}

/// Outcome of a full run
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeReport {
    /// Products of every merged task, grouped by task in completion order
    pub products: Vec<Product>,
    pub tasks_total: usize,
    pub tasks_merged: usize,
    pub tasks_failed: usize,
    pub failures: Vec<TaskFailure>,
}

impl ScrapeReport {
    pub const fn is_complete_success(&self) -> bool {
        self.tasks_failed == 0
    }
}

enum TaskOutcome {
    Merged,
    Failed(TaskFailure),
}

/// Fans tasks out over a bounded set of concurrent units
pub struct ScrapeOrchestrator {
    worker: Arc<ScrapeWorker>,
    sink: Arc<dyn ScrapeEventSink>,
    config: OrchestratorConfig,
}

impl ScrapeOrchestrator {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        sink: Arc<dyn ScrapeEventSink>,
        config: OrchestratorConfig,
    ) -> Result<Self, OrchestratorError> {
        if config.max_concurrent == 0 {
            return Err(OrchestratorError::Configuration(
                "max_concurrent must be greater than 0".to_string(),
            ));
        }
        if config.fetch_timeout.is_zero() {
            return Err(OrchestratorError::Configuration(
                "fetch_timeout must be greater than 0".to_string(),
            ));
        }

        let worker = ScrapeWorker::new(fetcher, &config.parsing, config.fetch_timeout)?;

        Ok(Self {
            worker: Arc::new(worker),
            sink,
            config,
        })
    }

    pub const fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Scrape every task and return the merged products
    pub async fn run(&self, tasks: Vec<ScrapeTask>) -> Vec<Product> {
        self.run_with_report(tasks, CancellationToken::new())
            .await
            .products
    }

    /// Scrape every locale x category listing built from `template`
    pub async fn run_grid(
        &self,
        locales: &[String],
        categories: &[String],
        template: &str,
    ) -> Vec<Product> {
        self.run(enumerate(locales, categories, template)).await
    }

    /// Scrape explicit listing URLs; products carry empty locale/category
    pub async fn run_urls(&self, urls: &[String]) -> Vec<Product> {
        self.run(from_urls(urls)).await
    }

    /// Enumerate `source` and run it with a report
    pub async fn run_source(&self, source: TaskSource, cancel: CancellationToken) -> ScrapeReport {
        self.run_with_report(source.into_tasks(), cancel).await
    }

    /// Scrape every task, stopping early when `cancel` fires
    ///
    /// Cancelled tasks are reported as failures; products merged before
    /// cancellation are kept.
    pub async fn run_with_report(
        &self,
        tasks: Vec<ScrapeTask>,
        cancel: CancellationToken,
    ) -> ScrapeReport {
        let tasks_total = tasks.len();
        let aggregate: Arc<Mutex<Vec<Product>>> = Arc::new(Mutex::new(Vec::new()));
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent));

        info!(
            "🚀 Creating {} concurrent tasks with semaphore control (max: {})",
            tasks_total, self.config.max_concurrent
        );

        let mut labels = Vec::with_capacity(tasks_total);
        let mut handles = Vec::with_capacity(tasks_total);

        for task in tasks {
            labels.push(task.label());

            let worker = Arc::clone(&self.worker);
            let sink = Arc::clone(&self.sink);
            let semaphore = Arc::clone(&semaphore);
            let aggregate = Arc::clone(&aggregate);
            let cancel = cancel.clone();

            handles.push(tokio::spawn(async move {
                Self::run_task(worker, sink, semaphore, aggregate, cancel, task).await
            }));
        }

        // 모든 태스크가 끝날 때까지 대기
        let results = futures::future::join_all(handles).await;

        let mut report = ScrapeReport {
            tasks_total,
            ..ScrapeReport::default()
        };

        for (label, result) in labels.into_iter().zip(results) {
            match result {
                Ok(TaskOutcome::Merged) => report.tasks_merged += 1,
                Ok(TaskOutcome::Failed(failure)) => report.failures.push(failure),
                Err(e) => {
                    warn!("❌ Task join failed for {}: {}", label.url, e);
                    report.failures.push(TaskFailure {
                        task: label,
                        stage: TaskStage::Failed,
                        error: e.to_string(),
                    });
                }
            }
        }
        report.tasks_failed = report.failures.len();
        report.products = std::mem::take(&mut *aggregate.lock().await);

        info!(
            "🎯 Scrape completed: {} tasks merged, {} failed, {} total products",
            report.tasks_merged,
            report.tasks_failed,
            report.products.len()
        );

        report
    }

    async fn run_task(
        worker: Arc<ScrapeWorker>,
        sink: Arc<dyn ScrapeEventSink>,
        semaphore: Arc<Semaphore>,
        aggregate: Arc<Mutex<Vec<Product>>>,
        cancel: CancellationToken,
        task: ScrapeTask,
    ) -> TaskOutcome {
        let label = task.label();
        let started = Instant::now();

        sink.emit(ScrapeEvent::StageEntered {
            task: label.clone(),
            stage: TaskStage::Pending,
        });

        let result = match Self::acquire(&semaphore, &cancel).await {
            Ok(_permit) => {
                debug!("🔓 Acquired permit for {}", task);
                worker.process(&task, sink.as_ref(), &cancel).await
            }
            Err(e) => Err(e),
        };

        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match result {
            Ok(products) => {
                let products_found = products.len();
                aggregate.lock().await.extend(products);
                sink.emit(ScrapeEvent::TaskMerged {
                    task: label,
                    products_found,
                    duration_ms,
                });
                TaskOutcome::Merged
            }
            Err(e) => {
                let failure = Self::failure(label, &e);
                sink.emit(ScrapeEvent::TaskFailed {
                    task: failure.task.clone(),
                    stage: failure.stage,
                    error: failure.error.clone(),
                    duration_ms,
                });
                TaskOutcome::Failed(failure)
            }
        }
    }

    /// Wait for a permit unless the run is cancelled first
    async fn acquire<'a>(
        semaphore: &'a Semaphore,
        cancel: &CancellationToken,
    ) -> Result<tokio::sync::SemaphorePermit<'a>, WorkerError> {
        let cancelled = || WorkerError::Cancelled {
            stage: TaskStage::Pending,
        };
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(cancelled()),
            permit = semaphore.acquire() => permit.map_err(|_| cancelled()),
        }
    }

    fn failure(task: TaskLabel, error: &WorkerError) -> TaskFailure {
        TaskFailure {
            task,
            stage: error.stage(),
            error: error.to_string(),
        }
    }
}
