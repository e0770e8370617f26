//! Scrape coordination
//!
//! This module contains the run-level logic, including:
//! - Concurrent per-source tasks with retry and backoff
//! - Classification of per-source failures
//! - The reporting window filter and final sort

mod coordinator;
mod error;
mod window;

pub use coordinator::{ScrapeReport, ScraperCoordinator};
pub use error::{dedup_messages, ErrorKind, ScrapingError};
pub use window::filter_and_sort;
