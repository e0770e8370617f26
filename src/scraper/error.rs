//! Per-source failure records and their user-facing rendering

use crate::models::Source;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::fmt;

/// Failure category for one source's scrape
///
/// | Kind | Cause | Retried |
/// |------|-------|---------|
/// | `Configuration` | No parser registered for the source | No |
/// | `NetworkTimeout` | Request exceeded the total timeout | Yes |
/// | `Network` | Connection or transport failure | Yes |
/// | `Parser` | Page fetched but unusable (bad status, changed markup) | No |
/// | `Unexpected` | Anything else | Yes |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    NetworkTimeout,
    Network,
    Parser,
    Unexpected,
}

impl ErrorKind {
    /// Whether another attempt may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NetworkTimeout | Self::Network | Self::Unexpected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "Configuration Error",
            Self::NetworkTimeout => "Network Timeout",
            Self::Network => "Network Error",
            Self::Parser => "Parser Error",
            Self::Unexpected => "Unexpected Error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal failure of one source within one run
#[derive(Debug, Clone)]
pub struct ScrapingError {
    pub source: Source,
    pub kind: ErrorKind,
    pub message: String,

    /// Diagnostic text such as the underlying error or attempt count
    pub detail: Option<String>,

    pub timestamp: DateTime<Utc>,
}

impl ScrapingError {
    /// Creates an error stamped with the current time
    pub fn new(
        source: Source,
        kind: ErrorKind,
        message: impl Into<String>,
        detail: Option<String>,
    ) -> Self {
        Self {
            source,
            kind,
            message: message.into(),
            detail,
            timestamp: Utc::now(),
        }
    }

    /// One-line summary suitable for end users
    pub fn to_user_message(&self) -> String {
        format!("Failed to fetch information for source: {}", self.source.name)
    }
}

impl fmt::Display for ScrapingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ScrapingError {}

/// User messages with repeats removed, in first-occurrence order
pub fn dedup_messages(errors: &[ScrapingError]) -> Vec<String> {
    let mut seen = HashSet::new();
    errors
        .iter()
        .map(ScrapingError::to_user_message)
        .filter(|message| seen.insert(message.clone()))
        .collect()
}
