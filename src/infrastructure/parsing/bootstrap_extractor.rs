//! Embedded bootstrap blob extractor
//!
//! Listing pages ship their product grid as a JavaScript assignment
//! (`window.REFURB_GRID_BOOTSTRAP = {...};`) inside a script tag. The
//! extractor strips every whitespace character from the page, matches
//! `window.<VAR>=` up to the first `};`, and re-appends the one closing brace
//! the terminator consumed.
//!
//! The repaired fragment is only valid JSON when exactly one brace was eaten
//! by the terminator. If the markup ever changes so that zero or two braces
//! are consumed, the fragment fails later at decode time; it never panics.
//!
//! Whitespace removal also applies inside JSON string values, so titles come
//! out without spaces. Names are therefore best taken from the detail URL.

use regex::Regex;
use tracing::debug;

use super::config::ParsingConfig;
use super::{ParsingError, ParsingResult};

/// Repaired JSON text pulled out of a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapFragment(String);

impl BootstrapFragment {
    /// Wrap already repaired JSON text
    pub fn new(json: impl Into<String>) -> Self {
        Self(json.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Finds and repairs the embedded grid blob
#[derive(Debug, Clone)]
pub struct BootstrapExtractor {
    pattern: Regex,
}

impl BootstrapExtractor {
    /// Create an extractor for the default bootstrap variable
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(&ParsingConfig::default())
    }

    /// Create an extractor for a configured bootstrap variable
    pub fn with_config(config: &ParsingConfig) -> ParsingResult<Self> {
        let variable = config.bootstrap_variable.as_str();

        // 공백 제거 후 매칭하므로 변수명에 공백이 있으면 절대 매칭되지 않음
        if variable.is_empty() || variable.chars().any(char::is_whitespace) {
            return Err(ParsingError::InvalidPattern {
                pattern: variable.to_string(),
                reason: "bootstrap variable must be a non-empty identifier".to_string(),
            });
        }

        let pattern_str = format!(r"window\.{}=(.+?)\}};", regex::escape(variable));
        let pattern = Regex::new(&pattern_str).map_err(|e| ParsingError::InvalidPattern {
            pattern: pattern_str.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self { pattern })
    }

    /// Remove every whitespace character (spaces, tabs, newlines, ...)
    pub fn normalize(body: &[u8]) -> String {
        String::from_utf8_lossy(body)
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect()
    }

    /// Locate the blob in `body` and append the trimmed closing brace
    pub fn extract(&self, body: &[u8]) -> ParsingResult<BootstrapFragment> {
        let normalized = Self::normalize(body);

        let captured = self
            .pattern
            .captures(&normalized)
            .and_then(|caps| caps.get(1))
            .ok_or(ParsingError::CannotMatchRegex)?
            .as_str();

        let mut json = String::with_capacity(captured.len() + 1);
        json.push_str(captured);
        json.push('}');

        debug!(
            "Extracted bootstrap fragment ({} bytes from {} normalized bytes)",
            json.len(),
            normalized.len()
        );

        Ok(BootstrapFragment(json))
    }
}
