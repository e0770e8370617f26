//! Parser contract and built-in extraction strategies
//!
//! Every source is handled by one [`EventParser`]. Parsers differ only in how
//! they extract events (embedded JSON-LD, CSS selectors, text mining, paged
//! calendars, JSON calendar APIs); they share two helpers:
//! - [`ScrapeSession::fetch_page`] for fetching and parsing a page
//! - [`filter_valid_events`] for dropping incomplete or stale events

pub mod dates;
mod json_api;
mod json_ld;
mod monthly;
mod registry;
mod selectors;
mod session;
mod text_search;
mod validate;

pub use json_api::JsonApiParser;
pub use json_ld::JsonLdParser;
pub use monthly::MonthlyCalendarParser;
pub use registry::{ParserFactory, ParserRegistry, RegistryError};
pub use selectors::SelectorParser;
pub use session::ScrapeSession;
pub use text_search::TextSearchParser;
pub use validate::{filter_valid_events, is_valid_event};

use crate::models::{Event, EventCategory, Source};
use async_trait::async_trait;
use thiserror::Error;

/// Why a parser could not produce events
///
/// The variant decides whether the coordinator retries: transport problems
/// may clear up on their own, content problems will not.
#[derive(Debug, Error)]
pub enum ParseFailure {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Network error fetching {url}: {message}")]
    Network { url: String, message: String },

    #[error("HTTP {status}: {url}")]
    Status { url: String, status: u16 },

    /// The page was fetched but could not be interpreted
    #[error("{0}")]
    Content(String),

    #[error("{0}")]
    Unexpected(#[from] anyhow::Error),
}

impl ParseFailure {
    /// Creates a content failure
    pub fn content(message: impl Into<String>) -> Self {
        Self::Content(message.into())
    }

    /// Classifies a transport-level `reqwest` error
    pub fn from_transport(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Network {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }
}

/// Extracts events for one source
///
/// Implementations hold their [`Source`] and receive a live session per call.
/// They perform network I/O only and never touch shared state.
#[async_trait]
pub trait EventParser: Send + Sync {
    /// Short strategy name used in logs
    fn name(&self) -> &str;

    /// Fetches and parses the source's pages into validated events
    async fn parse(&self, session: &ScrapeSession) -> Result<Vec<Event>, ParseFailure>;
}

/// Event category configured for a source (`parser_config.category`)
pub(crate) fn configured_category(source: &Source) -> EventCategory {
    match source.config_str("category").map(str::to_ascii_lowercase).as_deref() {
        Some("music") => EventCategory::Music,
        Some("community") => EventCategory::Community,
        _ => EventCategory::Food,
    }
}

/// Collapses runs of whitespace and trims
pub(crate) fn clean_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
