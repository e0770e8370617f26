//! Around the Grounds: an event schedule aggregator
//!
//! This crate scrapes brewery and music venue websites concurrently, normalizes
//! what it finds into a common [`Event`] model, and keeps the events that fall
//! inside a short upcoming window.

pub mod config;
pub mod models;
pub mod output;
pub mod parsers;
pub mod scraper;

use thiserror::Error;

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while preparing a scrape run
///
/// Per-source failures never surface here; they are reported as
/// [`scraper::ScrapingError`] values inside a [`scraper::ScrapeReport`].
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid scraper settings: {0}")]
    Settings(String),
}

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{load_sources, ScraperConfig, SourcesFile};
pub use models::{Event, EventCategory, Source};
pub use parsers::{EventParser, ParseFailure, ParserRegistry, ScrapeSession};
pub use scraper::{ErrorKind, ScrapeReport, ScraperCoordinator, ScrapingError};
