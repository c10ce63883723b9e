//! Configuration infrastructure
//!
//! Settings are layered in three steps, later ones winning:
//! 1. Built-in defaults (`defaults` module)
//! 2. Optional TOML file (explicit path, or `<config_dir>/refurb-scraper/config.toml`)
//! 3. Environment variables `REFURB_SCRAPER__<SECTION>__<KEY>`
//!
//! List values (`locales`, `categories`, `urls`) are comma-separated in the
//! environment.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

use crate::infrastructure::parsing::ParsingConfig;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "REFURB_SCRAPER";

/// Keys whose environment values are split on commas
const LIST_KEYS: [&str; 3] = ["scraper.locales", "scraper.categories", "scraper.urls"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {source}")]
    FileLoad {
        #[from]
        source: config::ConfigError,
    },

    #[error("Configuration validation failed: {message}")]
    Validation { message: String },
}

impl ConfigError {
    fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// What to scrape and how hard
    pub scraper: ScraperConfig,

    /// HTTP client behavior
    pub http: HttpConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Result output
    pub output: OutputConfig,
}

/// Scrape targets and pipeline knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Storefront locales, e.g. `es`, `fr`, `uk`
    pub locales: Vec<String>,

    /// Product categories, e.g. `mac`, `ipad`
    pub categories: Vec<String>,

    /// Explicit listing URLs; exclusive with locales/categories
    pub urls: Vec<String>,

    /// Listing URL with `{locale}` and `{category}` placeholders
    pub url_template: String,

    /// Name of the `window.<NAME>=` assignment carrying the grid
    pub bootstrap_variable: String,

    /// Slug prefix removed when deriving names from detail URLs
    pub name_prefix: String,

    /// Upper bound on in-flight fetches
    pub max_concurrent_requests: usize,

    /// Per-fetch deadline enforced by the orchestrator
    pub fetch_timeout_seconds: u64,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            locales: Vec::new(),
            categories: Vec::new(),
            urls: Vec::new(),
            url_template: defaults::URL_TEMPLATE.to_string(),
            bootstrap_variable: defaults::BOOTSTRAP_VARIABLE.to_string(),
            name_prefix: defaults::NAME_PREFIX.to_string(),
            max_concurrent_requests: defaults::MAX_CONCURRENT_REQUESTS,
            fetch_timeout_seconds: defaults::FETCH_TIMEOUT_SECONDS,
        }
    }
}

impl ScraperConfig {
    /// Parsing knobs derived from this section
    pub fn parsing_config(&self) -> ParsingConfig {
        ParsingConfig {
            bootstrap_variable: self.bootstrap_variable.clone(),
            name_prefix: self.name_prefix.clone(),
        }
    }

    /// Whether explicit URLs replace the locale x category product
    pub fn is_url_mode(&self) -> bool {
        !self.urls.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Transport-level request timeout in seconds
    pub request_timeout_seconds: u64,

    pub user_agent: String,

    /// Follow up to 10 redirects when true
    pub follow_redirects: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            user_agent: defaults::USER_AGENT.to_string(),
            follow_redirects: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs
    pub json_format: bool,

    /// Enable console output
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Log file name inside the log directory
    pub file_name: String,

    /// Number of rotated log files to keep (older files will be deleted)
    pub max_files: u32,

    /// Enable automatic log cleanup on startup
    pub auto_cleanup_logs: bool,

    /// Module-specific log level filters (e.g., "reqwest": "info")
    pub module_filters: HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            file_name: defaults::LOG_FILE_NAME.to_string(),
            max_files: defaults::LOG_MAX_FILES,
            auto_cleanup_logs: defaults::LOG_AUTO_CLEANUP,
            module_filters: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Print the aggregate as pretty JSON on stdout
    pub print_products: bool,
}

impl AppConfig {
    /// Check cross-field rules that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scraper = &self.scraper;

        if scraper.is_url_mode() && (!scraper.locales.is_empty() || !scraper.categories.is_empty()) {
            return Err(ConfigError::validation(
                "urls cannot be combined with locales/categories",
            ));
        }

        for raw in &scraper.urls {
            url::Url::parse(raw)
                .map_err(|e| ConfigError::validation(format!("invalid url '{raw}': {e}")))?;
        }

        for placeholder in ["{locale}", "{category}"] {
            if !scraper.url_template.contains(placeholder) {
                return Err(ConfigError::validation(format!(
                    "url_template must contain {placeholder}"
                )));
            }
        }

        if scraper.max_concurrent_requests == 0 {
            return Err(ConfigError::validation(
                "max_concurrent_requests must be greater than 0",
            ));
        }

        if scraper.fetch_timeout_seconds == 0 || self.http.request_timeout_seconds == 0 {
            return Err(ConfigError::validation("timeouts must be greater than 0"));
        }

        if scraper.bootstrap_variable.trim().is_empty() {
            return Err(ConfigError::validation("bootstrap_variable cannot be empty"));
        }

        if !self.logging.console_output && !self.logging.file_output {
            return Err(ConfigError::validation(
                "at least one of console_output/file_output must be enabled",
            ));
        }

        Ok(())
    }
}

/// Configuration loader
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    config_path: Option<PathBuf>,
    /// Stand-in for the process environment
    env_override: Option<HashMap<String, String>>,
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join("refurb-scraper");

        Ok(config_dir)
    }

    /// Loader using the default file location, if any
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader reading an explicit file, which must exist
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: Some(path.into()),
            env_override: None,
        }
    }

    /// Read environment values from `vars` instead of the process environment
    #[must_use]
    pub fn with_env_source(mut self, vars: HashMap<String, String>) -> Self {
        self.env_override = Some(vars);
        self
    }

    /// Build, deserialize and validate the layered configuration
    pub fn load(&self) -> Result<AppConfig> {
        let app_config = self.load_unvalidated()?;
        app_config.validate()?;
        Ok(app_config)
    }

    /// Build and deserialize the layered configuration without validating it
    ///
    /// For callers that layer further overrides on top and validate the result.
    pub fn load_unvalidated(&self) -> Result<AppConfig> {
        let defaults = config::Config::try_from(&AppConfig::default())
            .context("Failed to serialize default configuration")?;

        let mut builder = config::Config::builder().add_source(defaults);

        match &self.config_path {
            Some(path) => {
                info!("📄 Loading configuration from {}", path.display());
                builder = builder.add_source(config::File::from(path.as_path()).required(true));
            }
            None => {
                let default_path = Self::get_config_dir()
                    .map(|dir| dir.join("config.toml"))
                    .ok()
                    .filter(|p| p.exists());
                if let Some(path) = default_path {
                    info!("📄 Loading configuration from {}", path.display());
                    builder = builder.add_source(config::File::from(path).required(false));
                } else {
                    debug!("No configuration file found; using defaults and environment");
                }
            }
        }

        let mut environment = config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .list_separator(",");
        for key in LIST_KEYS {
            environment = environment.with_list_parse_key(key);
        }
        if let Some(vars) = &self.env_override {
            environment = environment.source(Some(vars.clone()));
        }

        let settings = builder
            .add_source(environment)
            .build()
            .map_err(ConfigError::from)
            .context("Failed to build configuration")?;

        let app_config: AppConfig = settings
            .try_deserialize()
            .map_err(ConfigError::from)
            .context("Failed to deserialize configuration")?;

        Ok(app_config)
    }
}

/// Default configuration values
pub mod defaults {
    /// Listing page location
    pub const URL_TEMPLATE: &str = "https://www.apple.com/{locale}/shop/refurbished/{category}";

    /// JavaScript variable holding the product grid
    pub const BOOTSTRAP_VARIABLE: &str = "REFURB_GRID_BOOTSTRAP";

    /// Detail URL slug prefix
    pub const NAME_PREFIX: &str = "Refurbished-";

    /// Default maximum concurrent requests
    pub const MAX_CONCURRENT_REQUESTS: usize = 8;

    /// Default per-fetch deadline in seconds
    pub const FETCH_TIMEOUT_SECONDS: u64 = 45;

    /// Default request timeout in seconds
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;

    pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

    // Log configuration defaults
    /// Default log level
    pub const LOG_LEVEL: &str = "info";

    /// Default JSON format setting
    pub const LOG_JSON_FORMAT: bool = false;

    /// Default console output setting
    pub const LOG_CONSOLE_OUTPUT: bool = true;

    /// Default file output setting
    pub const LOG_FILE_OUTPUT: bool = false;

    pub const LOG_FILE_NAME: &str = "refurb-scraper.log";

    /// Default maximum log files to keep
    pub const LOG_MAX_FILES: u32 = 5;

    /// Default auto cleanup logs setting
    pub const LOG_AUTO_CLEANUP: bool = true;
}

/// URL building helper functions
pub mod utils {
    /// Fill the listing template for one locale/category pair
    pub fn build_listing_url(template: &str, locale: &str, category: &str) -> String {
        template
            .replace("{locale}", locale)
            .replace("{category}", category)
    }
}
