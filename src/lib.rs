//! Refurbished Grid Scraper
//!
//! Batch scraper for refurbished-store listing pages. Each listing embeds its
//! product grid as a JavaScript assignment; the scraper fetches every
//! requested page concurrently, pulls the blob out, decodes it into
//! [`Product`] records and merges them into one list.
//!
//! ```no_run
//! use std::sync::Arc;
//! use refurb_scraper_lib::{HttpClient, OrchestratorConfig, ScrapeOrchestrator, TracingEventSink};
//! use refurb_scraper_lib::infrastructure::config::{defaults, HttpConfig};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let client = HttpClient::from_http_config(&HttpConfig::default())?;
//! let orchestrator = ScrapeOrchestrator::new(
//!     Arc::new(client),
//!     Arc::new(TracingEventSink),
//!     OrchestratorConfig::default(),
//! )?;
//! let products = orchestrator
//!     .run_grid(&["es".into()], &["mac".into()], defaults::URL_TEMPLATE)
//!     .await;
//! # Ok(())
//! # }
//! ```

// Module declarations
pub mod crawling;
pub mod domain;
pub mod infrastructure;

pub use crawling::{
    OrchestratorConfig, ScrapeEventSink, ScrapeOrchestrator, ScrapeReport, ScrapeTask,
    TaskSource, TracingEventSink,
};
pub use domain::{Product, ScrapeEvent, TaskStage};
pub use infrastructure::{FetchError, HttpClient, PageFetcher, ParsingError};
