//! Infrastructure layer: configuration, logging, HTTP and parsing

pub mod config;
pub mod logging;
pub mod parsing;
pub mod parsing_error;
pub mod simple_http_client;

// Re-export commonly used items
pub use config::{AppConfig, ConfigManager};
pub use logging::{get_log_directory, init_logging, init_logging_with_config};
pub use parsing::{BootstrapExtractor, ParsingConfig, ParsingError, ParsingResult, ProductGridParser};
pub use simple_http_client::{FetchError, HttpClient, HttpClientConfig, PageFetcher};
