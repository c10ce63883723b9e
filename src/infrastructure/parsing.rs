//! Listing page parsing
//!
//! Two steps: [`BootstrapExtractor`] pulls the embedded grid blob out of the
//! raw page, and [`ProductGridParser`] decodes it into products.

pub mod bootstrap_extractor;
pub mod config;
pub mod context;
pub mod error;
pub mod product_grid_parser;

// Re-export public types
pub use bootstrap_extractor::{BootstrapExtractor, BootstrapFragment};
pub use config::ParsingConfig;
pub use context::ParseContext;
pub use error::{ParsingError, ParsingResult};
pub use product_grid_parser::ProductGridParser;

/// Parser that needs task context to build its output
pub trait ContextualParser {
    type Input;
    type Output;
    type Context;

    fn parse_with_context(&self, input: &Self::Input, context: &Self::Context) -> ParsingResult<Self::Output>;
}
