//! End-to-end scrape runs against fake and mock fetchers
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use proptest::prelude::*;
use refurb_scraper_lib::crawling::{RecordingEventSink, ScrapeTask};
use refurb_scraper_lib::infrastructure::config::defaults::URL_TEMPLATE;
use refurb_scraper_lib::infrastructure::config::HttpConfig;
use refurb_scraper_lib::{
    FetchError, HttpClient, OrchestratorConfig, PageFetcher, ScrapeEvent, ScrapeOrchestrator,
    TaskStage,
};
use serde_json::json;
use tokio_util::sync::CancellationToken;

fn grid_page(tiles: &serde_json::Value) -> Vec<u8> {
    format!(
        "<html>\n<head><script>window.analytics = {{}};</script></head>\n<body>\n\
         <script type=\"text/javascript\">\n    window.REFURB_GRID_BOOTSTRAP = {};\n</script>\n</body>\n</html>",
        json!({ "tiles": tiles })
    )
    .into_bytes()
}

fn tiles(count: usize) -> serde_json::Value {
    let tiles: Vec<_> = (0..count)
        .map(|i| {
            json!({
                "partNumber": format!("FN{i}/A"),
                "filters": { "dimensions": { "refurbClearModel": "macbookair", "dimensionColor": "silver" } },
                "productDetailsUrl": format!("/shop/product/FN{i}/A/Refurbished-MacBook-Air-13?fnode=1"),
                "price": { "seoPrice": 899.0, "originalProductAmount": 999.0 },
                "image": { "srcSet": { "src": format!("https://store.test/img{i}.png?resize=300") } }
            })
        })
        .collect();
    serde_json::Value::Array(tiles)
}

/// Serves canned bodies by URL; unknown URLs fail with 404
#[derive(Default)]
struct MapFetcher {
    pages: HashMap<String, Vec<u8>>,
}

impl MapFetcher {
    fn with(mut self, url: &str, body: Vec<u8>) -> Self {
        self.pages.insert(url.to_string(), body);
        self
    }
}

#[async_trait]
impl PageFetcher for MapFetcher {
    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.pages.get(url).cloned().ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            code: 404,
            reason: "Not Found".to_string(),
        })
    }
}

fn orchestrator(
    fetcher: impl PageFetcher + 'static,
    sink: Arc<RecordingEventSink>,
) -> ScrapeOrchestrator {
    ScrapeOrchestrator::new(Arc::new(fetcher), sink, OrchestratorConfig::default()).unwrap()
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| (*s).to_string()).collect()
}

fn failures(sink: &RecordingEventSink) -> Vec<(String, TaskStage, String)> {
    sink.events()
        .into_iter()
        .filter_map(|e| match e {
            ScrapeEvent::TaskFailed {
                task, stage, error, ..
            } => Some((task.url, stage, error)),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn grid_run_tags_every_product_with_its_task() {
    let fetcher = MapFetcher::default()
        .with("https://www.apple.com/es/shop/refurbished/mac", grid_page(&tiles(3)))
        .with("https://www.apple.com/fr/shop/refurbished/mac", grid_page(&tiles(2)));
    let sink = Arc::new(RecordingEventSink::new());
    let orch = orchestrator(fetcher, sink.clone());

    let products = orch
        .run_grid(&strings(&["es", "fr"]), &strings(&["mac"]), URL_TEMPLATE)
        .await;

    assert_eq!(products.len(), 5);
    assert_eq!(products.iter().filter(|p| p.locale() == "es").count(), 3);
    assert_eq!(products.iter().filter(|p| p.locale() == "fr").count(), 2);
    assert!(products.iter().all(|p| p.category() == "mac"));

    let product = &products[0];
    assert_eq!(product.name(), "MacBook Air 13");
    assert!(product.image_url().starts_with("https://store.test/img"));
    assert!(!product.image_url().contains('?'));
    assert!(!product.store_url().contains('?'));
    assert!(failures(&sink).is_empty());
}

#[tokio::test]
async fn page_without_blob_fails_alone() {
    let fetcher = MapFetcher::default()
        .with("https://x/es/mac", b"<html><body>maintenance</body></html>".to_vec())
        .with("https://x/es/ipad", grid_page(&tiles(4)));
    let sink = Arc::new(RecordingEventSink::new());
    let orch = orchestrator(fetcher, sink.clone());

    let products = orch.run_urls(&strings(&["https://x/es/mac", "https://x/es/ipad"])).await;

    assert_eq!(products.len(), 4);
    assert!(products.iter().all(|p| p.locale().is_empty() && p.category().is_empty()));

    let failed = failures(&sink);
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].0, "https://x/es/mac");
    assert_eq!(failed[0].1, TaskStage::Extracting);
    assert!(failed[0].2.contains("cannot match regex"));
}

#[tokio::test]
async fn malformed_blob_is_a_decode_failure() {
    let broken = b"<script>window.REFURB_GRID_BOOTSTRAP = {\"tiles\": [{\"partNumber\": 42}]};</script>".to_vec();
    let fetcher = MapFetcher::default()
        .with("https://x/broken", broken)
        .with("https://x/good", grid_page(&tiles(1)));
    let sink = Arc::new(RecordingEventSink::new());
    let orch = orchestrator(fetcher, sink.clone());

    let report = orch
        .run_with_report(
            refurb_scraper_lib::crawling::tasks::from_urls(&strings(&["https://x/broken", "https://x/good"])),
            CancellationToken::new(),
        )
        .await;

    assert_eq!(report.products.len(), 1);
    assert_eq!(report.tasks_merged, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].stage, TaskStage::Decoding);
    assert_eq!(failures(&sink).len(), 1);
}

#[tokio::test]
async fn unreachable_pages_yield_empty_result() {
    let sink = Arc::new(RecordingEventSink::new());
    let orch = orchestrator(MapFetcher::default(), sink.clone());

    let products = orch
        .run_grid(&strings(&["es", "fr", "uk"]), &strings(&["mac", "ipad"]), URL_TEMPLATE)
        .await;

    assert!(products.is_empty());
    let failed = failures(&sink);
    assert_eq!(failed.len(), 6);
    assert!(failed.iter().all(|(_, stage, _)| *stage == TaskStage::Fetching));
}

#[tokio::test]
async fn duplicate_tasks_keep_duplicate_products() {
    let fetcher = MapFetcher::default().with("https://x/a", grid_page(&tiles(2)));
    let orch = orchestrator(fetcher, Arc::new(RecordingEventSink::new()));

    let products = orch.run_urls(&strings(&["https://x/a", "https://x/a"])).await;

    assert_eq!(products.len(), 4);
    assert_eq!(products.iter().filter(|p| p.id() == "FN0/A").count(), 2);
}

#[tokio::test]
async fn every_task_walks_the_stage_machine() {
    let fetcher = MapFetcher::default().with("https://x/a", grid_page(&tiles(1)));
    let sink = Arc::new(RecordingEventSink::new());
    let orch = orchestrator(fetcher, sink.clone());

    orch.run_urls(&strings(&["https://x/a"])).await;

    let stages: Vec<TaskStage> = sink
        .events()
        .into_iter()
        .filter_map(|e| match e {
            ScrapeEvent::StageEntered { stage, .. } => Some(stage),
            ScrapeEvent::TaskMerged { .. } => Some(TaskStage::Merged),
            ScrapeEvent::TaskFailed { .. } => Some(TaskStage::Failed),
            ScrapeEvent::ProductFound { .. } => None,
        })
        .collect();
    assert_eq!(
        stages,
        vec![
            TaskStage::Pending,
            TaskStage::Fetching,
            TaskStage::Extracting,
            TaskStage::Decoding,
            TaskStage::Merged,
        ]
    );
}

/// Never answers until the run is cancelled
struct HangingFetcher;

#[async_trait]
impl PageFetcher for HangingFetcher {
    async fn get(&self, _url: &str) -> Result<Vec<u8>, FetchError> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn cancellation_still_joins_every_task() {
    let sink = Arc::new(RecordingEventSink::new());
    let orch = orchestrator(HangingFetcher, sink.clone());
    let cancel = CancellationToken::new();
    let tasks: Vec<ScrapeTask> = (0..20)
        .map(|i| ScrapeTask::new("es", format!("c{i}"), format!("https://x/{i}")))
        .collect();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let report = tokio::time::timeout(Duration::from_secs(5), orch.run_with_report(tasks, cancel))
        .await
        .expect("run must return after cancellation");

    assert_eq!(report.tasks_total, 20);
    assert_eq!(report.tasks_failed, 20);
    assert!(report.products.is_empty());
    assert!(report
        .failures
        .iter()
        .all(|f| matches!(f.stage, TaskStage::Pending | TaskStage::Fetching)));
    assert_eq!(failures(&sink).len(), 20);
}

#[tokio::test]
async fn http_client_end_to_end() {
    let mut server = mockito::Server::new_async().await;
    let _ok = server
        .mock("GET", "/es/shop/refurbished/ipad")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(grid_page(&tiles(2)))
        .create_async()
        .await;
    let _missing = server
        .mock("GET", "/fr/shop/refurbished/ipad")
        .with_status(404)
        .create_async()
        .await;

    let client = HttpClient::from_http_config(&HttpConfig::default()).unwrap();
    let sink = Arc::new(RecordingEventSink::new());
    let orch = ScrapeOrchestrator::new(Arc::new(client), sink.clone(), OrchestratorConfig::default())
        .unwrap();
    let template = format!("{}/{{locale}}/shop/refurbished/{{category}}", server.url());

    let products = orch
        .run_grid(&strings(&["es", "fr"]), &strings(&["ipad"]), &template)
        .await;

    assert_eq!(products.len(), 2);
    assert!(products.iter().all(|p| p.locale() == "es" && p.category() == "ipad"));
    let failed = failures(&sink);
    assert_eq!(failed.len(), 1);
    assert!(failed[0].2.contains("404"));
}

/// Returns `records` tiles after yielding a URL-dependent number of times
struct ShufflingFetcher {
    records: usize,
}

#[async_trait]
impl PageFetcher for ShufflingFetcher {
    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let spins = url.bytes().map(usize::from).sum::<usize>() % 7;
        for _ in 0..spins {
            tokio::task::yield_now().await;
        }
        Ok(grid_page(&tiles(self.records)))
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn aggregate_holds_every_record(tasks in 0usize..12, records in 0usize..6, limit in 1usize..5) {
        let config = OrchestratorConfig { max_concurrent: limit, ..OrchestratorConfig::default() };
        let orch = ScrapeOrchestrator::new(
            Arc::new(ShufflingFetcher { records }),
            Arc::new(RecordingEventSink::new()),
            config,
        ).unwrap();
        let urls: Vec<String> = (0..tasks).map(|i| format!("https://x/page/{i}")).collect();

        let products = tokio_test::block_on(orch.run_urls(&urls));

        prop_assert_eq!(products.len(), tasks * records);
    }
}
