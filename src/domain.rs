//! Domain module - product records and task events
//!
//! Modern Rust module organization (Rust 2018+ style):
//! - Each module is its own file in the domain/ directory
//! - Public exports are defined here for convenience

pub mod events;
pub mod product;

pub use events::{ScrapeEvent, TaskLabel, TaskStage};
pub use product::{Product, ProductFields};
