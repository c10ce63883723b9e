//! # Scrape Task Definitions
//!
//! A task is one listing page to fetch, tagged with the locale and category
//! every product found on it will carry. Tasks are immutable once built.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::TaskLabel;
use crate::infrastructure::config::ScraperConfig;
use crate::infrastructure::config::utils::build_listing_url;

/// Unique identifier for scrape tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a new unique task ID
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One unit of work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeTask {
    pub task_id: TaskId,
    /// Empty when the task came from an explicit URL
    pub locale: String,
    /// Empty when the task came from an explicit URL
    pub category: String,
    pub url: String,
}

impl ScrapeTask {
    pub fn new(locale: impl Into<String>, category: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            task_id: TaskId::new(),
            locale: locale.into(),
            category: category.into(),
            url: url.into(),
        }
    }

    /// Identity attached to every event this task emits
    pub fn label(&self) -> TaskLabel {
        TaskLabel {
            task_id: self.task_id.to_string(),
            locale: self.locale.clone(),
            category: self.category.clone(),
            url: self.url.clone(),
        }
    }
}

impl fmt::Display for ScrapeTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.locale.is_empty() && self.category.is_empty() {
            write!(f, "{}", self.url)
        } else {
            write!(f, "{}/{} ({})", self.locale, self.category, self.url)
        }
    }
}

/// Where the task list comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskSource {
    /// Every locale paired with every category, URL built from `template`
    Grid {
        locales: Vec<String>,
        categories: Vec<String>,
        template: String,
    },
    /// One task per URL, locale and category left empty
    Urls(Vec<String>),
}

impl TaskSource {
    /// URL mode wins when any URL is configured
    pub fn from_config(scraper: &ScraperConfig) -> Self {
        if scraper.is_url_mode() {
            Self::Urls(scraper.urls.clone())
        } else {
            Self::Grid {
                locales: scraper.locales.clone(),
                categories: scraper.categories.clone(),
                template: scraper.url_template.clone(),
            }
        }
    }

    pub fn into_tasks(self) -> Vec<ScrapeTask> {
        match self {
            Self::Grid {
                locales,
                categories,
                template,
            } => enumerate(&locales, &categories, &template),
            Self::Urls(urls) => from_urls(&urls),
        }
    }
}

/// Cartesian product, locale-major: `es/mac, es/ipad, fr/mac, fr/ipad`
pub fn enumerate(locales: &[String], categories: &[String], template: &str) -> Vec<ScrapeTask> {
    locales
        .iter()
        .flat_map(|locale| {
            categories.iter().map(move |category| {
                ScrapeTask::new(
                    locale.as_str(),
                    category.as_str(),
                    build_listing_url(template, locale, category),
                )
            })
        })
        .collect()
}

/// One task per URL, duplicates kept
pub fn from_urls(urls: &[String]) -> Vec<ScrapeTask> {
    urls.iter()
        .map(|url| ScrapeTask::new("", "", url.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::defaults::URL_TEMPLATE;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn enumerates_locale_major() {
        let tasks = enumerate(&strings(&["es", "fr"]), &strings(&["mac", "ipad"]), URL_TEMPLATE);

        let pairs: Vec<_> = tasks
            .iter()
            .map(|t| (t.locale.as_str(), t.category.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![("es", "mac"), ("es", "ipad"), ("fr", "mac"), ("fr", "ipad")]
        );
        assert_eq!(tasks[3].url, "https://www.apple.com/fr/shop/refurbished/ipad");
    }

    #[test]
    fn empty_side_yields_no_tasks() {
        assert!(enumerate(&[], &strings(&["mac"]), URL_TEMPLATE).is_empty());
        assert!(enumerate(&strings(&["es"]), &[], URL_TEMPLATE).is_empty());
    }

    #[test]
    fn url_tasks_have_empty_tags_and_keep_duplicates() {
        let tasks = from_urls(&strings(&["https://a/x", "https://a/x"]));

        assert_eq!(tasks.len(), 2);
        assert!(tasks.iter().all(|t| t.locale.is_empty() && t.category.is_empty()));
        assert_ne!(tasks[0].task_id, tasks[1].task_id);
    }

    #[test]
    fn label_mirrors_task() {
        let task = ScrapeTask::new("uk", "mac", "https://www.apple.com/uk/shop/refurbished/mac");
        let label = task.label();

        assert_eq!(label.task_id, task.task_id.to_string());
        assert_eq!(label.locale, "uk");
        assert_eq!(label.url, task.url);
        assert_eq!(task.to_string(), "uk/mac (https://www.apple.com/uk/shop/refurbished/mac)");
    }

    #[test]
    fn source_dispatches() {
        let grid = TaskSource::Grid {
            locales: strings(&["es"]),
            categories: strings(&["mac", "ipad"]),
            template: URL_TEMPLATE.to_string(),
        };
        assert_eq!(grid.into_tasks().len(), 2);
        assert_eq!(TaskSource::Urls(strings(&["u"])).into_tasks().len(), 1);
    }

    #[test]
    fn source_from_config() {
        let mut scraper = ScraperConfig {
            locales: strings(&["es", "fr"]),
            categories: strings(&["mac"]),
            ..ScraperConfig::default()
        };
        assert!(matches!(TaskSource::from_config(&scraper), TaskSource::Grid { .. }));

        scraper.urls = strings(&["https://www.apple.com/es/shop/refurbished/mac"]);
        assert_eq!(
            TaskSource::from_config(&scraper),
            TaskSource::Urls(scraper.urls.clone())
        );
    }
}
