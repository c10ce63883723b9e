//! `refurb-scraper` command line entry point

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use refurb_scraper_lib::infrastructure::config::{AppConfig, ConfigManager};
use refurb_scraper_lib::infrastructure::logging::init_logging_with_config;
use refurb_scraper_lib::{
    HttpClient, OrchestratorConfig, ScrapeOrchestrator, TaskSource, TracingEventSink,
};

#[derive(Parser, Debug)]
#[command(name = "refurb-scraper", version)]
#[command(about = "Scrape refurbished store listing grids into one product list")]
struct Cli {
    /// Config file (TOML); defaults to <config_dir>/refurb-scraper/config.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Storefront locale, repeatable
    #[arg(long = "locale")]
    locales: Vec<String>,

    /// Product category, repeatable
    #[arg(long = "category")]
    categories: Vec<String>,

    /// Explicit listing URL, repeatable; replaces locale/category mode
    #[arg(long = "url", conflicts_with_all = ["locales", "categories"])]
    urls: Vec<String>,

    /// Maximum concurrent fetches
    #[arg(long)]
    concurrency: Option<usize>,

    /// Print the products as pretty JSON on stdout
    #[arg(long)]
    print: bool,

    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// CLI values win over loaded configuration
    fn apply(&self, config: &mut AppConfig) {
        if !self.urls.is_empty() {
            config.scraper.urls.clone_from(&self.urls);
            config.scraper.locales.clear();
            config.scraper.categories.clear();
        } else if !self.locales.is_empty() || !self.categories.is_empty() {
            config.scraper.urls.clear();
            if !self.locales.is_empty() {
                config.scraper.locales.clone_from(&self.locales);
            }
            if !self.categories.is_empty() {
                config.scraper.categories.clone_from(&self.categories);
            }
        }
        if let Some(concurrency) = self.concurrency {
            config.scraper.max_concurrent_requests = concurrency;
        }
        if let Some(level) = &self.log_level {
            config.logging.level.clone_from(level);
        }
        if self.print {
            config.output.print_products = true;
        }
    }
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };

    let mut config = manager.load_unvalidated()?;
    cli.apply(&mut config);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    init_logging_with_config(config.logging.clone()).context("Failed to initialize logging")?;
    info!(build = env!("CARGO_PKG_VERSION"), "initializing application");
    info!("loaded config: {:?}", config.scraper);

    let client = HttpClient::from_http_config(&config.http).context("Failed to create HTTP client")?;
    let orchestrator = ScrapeOrchestrator::new(
        Arc::new(client),
        Arc::new(TracingEventSink),
        OrchestratorConfig::from_scraper_config(&config.scraper),
    )
    .context("Failed to create orchestrator")?;

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("🛑 Ctrl-C received, cancelling remaining tasks");
                cancel.cancel();
            }
        }
    });

    let report = orchestrator
        .run_source(TaskSource::from_config(&config.scraper), cancel)
        .await;

    info!(
        total_products = report.products.len(),
        tasks_failed = report.tasks_failed,
        "finished scraping"
    );

    if config.output.print_products {
        let json = serde_json::to_string_pretty(&report.products)
            .context("Failed to serialize products")?;
        println!("{json}");
    }

    Ok(())
}
