//! Parsing context for grid decoding
//!
//! Carries the task parameters that end up on every decoded product.

/// Context information for parsing operations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseContext {
    /// Locale of the listing page (empty in URL mode)
    pub locale: String,

    /// Category of the listing page (empty in URL mode)
    pub category: String,

    /// Page the fragment came from, for diagnostics
    pub source_url: Option<String>,
}

impl ParseContext {
    /// Create new parse context
    pub fn new(locale: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            category: category.into(),
            source_url: None,
        }
    }

    /// Attach the source page URL
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }
}
