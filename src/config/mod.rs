//! Configuration module
//!
//! This module handles loading, parsing, and validating the sources file: the
//! list of breweries and venues to scrape, plus optional scraper settings.
//!
//! # Example
//!
//! ```no_run
//! use grounds_events::config::load_sources;
//! use std::path::Path;
//!
//! let file = load_sources(Path::new("config/sources.json")).unwrap();
//! println!("Loaded {} sources", file.sources().len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{ScraperConfig, SourcesFile, DEFAULT_USER_AGENT};

// Re-export parser functions
pub use parser::{load_sources, parse_sources};
pub use validation::validate;
