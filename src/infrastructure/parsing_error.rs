//! Parsing error types for bootstrap extraction and grid decoding
//!
//! `CannotMatchRegex` is kept as its own variant so callers can tell
//! "page carried no embedded data" apart from "embedded data was broken".

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParsingError {
    /// The bootstrap marker was not found in the page
    #[error("cannot match regex")]
    CannotMatchRegex,

    /// The repaired fragment is not valid JSON or does not fit the grid schema
    #[error("unmarshalling json: {message} (line {line}, column {column})")]
    Decode {
        message: String,
        line: usize,
        column: usize,
    },

    /// The configured bootstrap variable produced an unusable pattern
    #[error("Invalid bootstrap pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

impl ParsingError {
    /// Wrap a serde_json diagnostic
    pub fn decode(err: &serde_json::Error) -> Self {
        Self::Decode {
            message: err.to_string(),
            line: err.line(),
            column: err.column(),
        }
    }

    /// Whether the page simply had no embedded blob
    pub const fn is_missing_blob(&self) -> bool {
        matches!(self, Self::CannotMatchRegex)
    }
}

pub type ParsingResult<T> = Result<T, ParsingError>;
