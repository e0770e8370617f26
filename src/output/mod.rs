//! Output module for presenting scrape results
//!
//! This module handles:
//! - Plain-text rendering of events and failures for the terminal
//! - The JSON payload consumed by the published site
//! - Writing a local preview of that payload
//! - Mapping a run's result onto the process exit code

mod preview;
mod text;
mod web;

pub use preview::{write_preview, PREVIEW_FILE_NAME};
pub use text::format_events_text;
pub use web::{format_time, WebEvent, WebPayload};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Overall result of a run, as seen by the shell
///
/// | Outcome | Events | Errors | Exit code |
/// |---------|--------|--------|-----------|
/// | `Success` | any | none | 0 |
/// | `Partial` | some | some | 2 |
/// | `Failure` | none | some | 1 |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Success,
    Partial,
    Failure,
}

impl RunOutcome {
    /// Classifies a run from its event and error counts
    pub fn classify(events: usize, errors: usize) -> Self {
        match (events, errors) {
            (_, 0) => Self::Success,
            (0, _) => Self::Failure,
            _ => Self::Partial,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
            Self::Partial => 2,
        }
    }
}
