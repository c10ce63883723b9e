//! Parsing configuration for bootstrap extraction
//!
//! Centralized knobs for where the embedded blob lives and how names are derived.

use serde::{Deserialize, Serialize};

/// Main parsing configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsingConfig {
    /// Name of the `window.<NAME>=` variable holding the grid blob
    pub bootstrap_variable: String,

    /// Prefix stripped from the URL slug when a tile has no title
    pub name_prefix: String,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        use crate::infrastructure::config::defaults;
        Self {
            bootstrap_variable: defaults::BOOTSTRAP_VARIABLE.to_string(),
            name_prefix: defaults::NAME_PREFIX.to_string(),
        }
    }
}
