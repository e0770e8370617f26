//! Scraper coordinator - concurrent multi-source scrape orchestration
//!
//! Every source gets its own task; all tasks share one [`ScrapeSession`]
//! whose connection semaphore caps simultaneous requests. Each task walks
//! the same state machine:
//!
//! 1. Look up the parser (unknown key → `Configuration`, no retry)
//! 2. Attempt `parse` up to `max_retries` times
//! 3. Back off `retry_base_delay * 2^n` after the n-th retryable failure
//! 4. Stop immediately on a parser (content) failure
//!
//! A failing or panicking task never affects its siblings; its outcome is
//! recorded as a [`ScrapingError`] in the run's [`ScrapeReport`].

use crate::config::ScraperConfig;
use crate::models::{Event, Source};
use crate::output::RunOutcome;
use crate::parsers::{ParseFailure, ParserRegistry, ScrapeSession};
use crate::scraper::error::{dedup_messages, ErrorKind, ScrapingError};
use crate::scraper::window::filter_and_sort;
use crate::SetupError;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

/// Events and errors from one run
///
/// A fresh report is returned from every call, so errors never leak from one
/// run into the next.
#[derive(Debug, Default)]
pub struct ScrapeReport {
    /// Filtered to the reporting window and sorted
    pub events: Vec<Event>,

    /// One entry per failed source
    pub errors: Vec<ScrapingError>,
}

impl ScrapeReport {
    pub fn errors(&self) -> &[ScrapingError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Deduplicated user-facing error lines
    pub fn user_messages(&self) -> Vec<String> {
        dedup_messages(&self.errors)
    }

    /// Classifies the run for the process exit code
    pub fn outcome(&self) -> RunOutcome {
        RunOutcome::classify(self.events.len(), self.errors.len())
    }
}

/// Retry settings copied into each task
#[derive(Debug, Clone, Copy)]
struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
    timeout_secs: u64,
}

impl RetryPolicy {
    fn from_config(config: &ScraperConfig) -> Self {
        Self {
            max_retries: config.max_retries.max(1),
            base_delay: config.retry_base_delay(),
            timeout_secs: config.timeout_secs,
        }
    }

    /// Delay after the given 0-based failed attempt
    fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Maps a parser failure onto the error taxonomy
fn classify(failure: &ParseFailure) -> ErrorKind {
    match failure {
        ParseFailure::Timeout { .. } => ErrorKind::NetworkTimeout,
        ParseFailure::Network { .. } => ErrorKind::Network,
        ParseFailure::Status { .. } | ParseFailure::Content(_) => ErrorKind::Parser,
        ParseFailure::Unexpected(_) => ErrorKind::Unexpected,
    }
}

/// Builds the terminal error record for a failure
fn terminal_error(
    source: &Source,
    kind: ErrorKind,
    failure: &ParseFailure,
    policy: &RetryPolicy,
) -> ScrapingError {
    let exhausted = Some(format!("Failed after {} attempts", policy.max_retries));
    let (message, detail) = match kind {
        ErrorKind::NetworkTimeout => (
            format!("Connection timeout after {}s", policy.timeout_secs),
            exhausted,
        ),
        ErrorKind::Network => (format!("Network error: {failure}"), exhausted),
        ErrorKind::Parser => (format!("Parsing failed: {failure}"), Some(failure.to_string())),
        ErrorKind::Unexpected | ErrorKind::Configuration => (
            format!("Unexpected error: {failure}"),
            Some(failure.to_string()),
        ),
    };
    ScrapingError::new(source.clone(), kind, message, detail)
}

/// Runs one source through lookup, attempts, and backoff
async fn scrape_source(
    registry: &ParserRegistry,
    session: &ScrapeSession,
    source: &Source,
    policy: RetryPolicy,
) -> Result<Vec<Event>, ScrapingError> {
    let parser = match registry.create(source) {
        Ok(parser) => parser,
        Err(e) => {
            tracing::error!("Configuration error for {}: {}", source.name, e);
            return Err(ScrapingError::new(
                source.clone(),
                ErrorKind::Configuration,
                format!("Parser not found for source key: {}", source.parser_key()),
                Some(e.to_string()),
            ));
        }
    };

    let mut attempt = 0;
    loop {
        tracing::info!(
            "Scraping {} with {} (attempt {}/{})...",
            source.name,
            parser.name(),
            attempt + 1,
            policy.max_retries
        );

        let failure = match parser.parse(session).await {
            Ok(events) => {
                tracing::info!("Found {} events for {}", events.len(), source.name);
                return Ok(events);
            }
            Err(failure) => failure,
        };

        let kind = classify(&failure);
        if !kind.is_retryable() || attempt + 1 >= policy.max_retries {
            let error = terminal_error(source, kind, &failure, &policy);
            tracing::error!("{} for {}: {}", kind, source.name, error.message);
            return Err(error);
        }

        let wait = policy.backoff(attempt);
        tracing::warn!(
            "{} scraping {}, retrying in {:?}: {}",
            kind,
            source.name,
            wait,
            failure
        );
        tokio::time::sleep(wait).await;
        attempt += 1;
    }
}

/// Coordinates scrapes across all configured sources
pub struct ScraperCoordinator {
    config: ScraperConfig,
    registry: Arc<ParserRegistry>,
}

impl ScraperCoordinator {
    /// Creates a coordinator
    ///
    /// # Arguments
    ///
    /// * `config` - Concurrency, timeout, retry, and window settings
    /// * `registry` - Parsers available to sources
    pub fn new(config: ScraperConfig, registry: Arc<ParserRegistry>) -> Self {
        Self { config, registry }
    }

    /// Scrapes every source concurrently
    ///
    /// All tasks are spawned up front; the session's connection cap provides
    /// backpressure. Per-source failures end up in the report, never as an
    /// `Err`.
    ///
    /// # Returns
    ///
    /// * `Ok(ScrapeReport)` - Windowed, sorted events plus per-source errors
    /// * `Err(SetupError)` - The HTTP session could not be built
    ///
    /// # Example
    ///
    /// ```no_run
    /// use grounds_events::{ParserRegistry, ScraperConfig, ScraperCoordinator, Source};
    /// use std::sync::Arc;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let coordinator = ScraperCoordinator::new(
    ///     ScraperConfig::default(),
    ///     Arc::new(ParserRegistry::with_builtin()),
    /// );
    /// let sources = vec![Source::new("obec", "Obec Brewing", "https://obecbrewing.com/")
    ///     .with_parser_type("json_ld")];
    ///
    /// let report = coordinator.scrape_all(&sources).await?;
    /// for event in &report.events {
    ///     println!("{}", event);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn scrape_all(&self, sources: &[Source]) -> Result<ScrapeReport, SetupError> {
        let session = ScrapeSession::from_config(&self.config, self.config.max_concurrent)?;
        let policy = RetryPolicy::from_config(&self.config);

        tracing::info!(
            "Scraping {} sources ({} concurrent connections)",
            sources.len(),
            self.config.max_concurrent
        );

        let tasks = sources.iter().map(|source| {
            let registry = Arc::clone(&self.registry);
            let session = session.clone();
            let task_source = source.clone();
            let handle = tokio::spawn(async move {
                scrape_source(&registry, &session, &task_source, policy).await
            });
            async move { (source, handle.await) }
        });

        let mut events = Vec::new();
        let mut errors = Vec::new();
        for (source, joined) in join_all(tasks).await {
            match joined {
                Ok(Ok(found)) => events.extend(found),
                Ok(Err(error)) => errors.push(error),
                Err(join_error) => {
                    tracing::error!("Task for {} aborted: {}", source.name, join_error);
                    errors.push(ScrapingError::new(
                        source.clone(),
                        ErrorKind::Unexpected,
                        format!("Unexpected error: {join_error}"),
                        Some(join_error.to_string()),
                    ));
                }
            }
        }

        Ok(self.finish(events, errors, &session))
    }

    /// Scrapes a single source over its own one-connection session
    pub async fn scrape_one(&self, source: &Source) -> Result<ScrapeReport, SetupError> {
        let session = ScrapeSession::from_config(&self.config, 1)?;
        let policy = RetryPolicy::from_config(&self.config);

        let (events, errors) = match scrape_source(&self.registry, &session, source, policy).await {
            Ok(events) => (events, Vec::new()),
            Err(error) => (Vec::new(), vec![error]),
        };

        Ok(self.finish(events, errors, &session))
    }

    fn finish(
        &self,
        events: Vec<Event>,
        errors: Vec<ScrapingError>,
        session: &ScrapeSession,
    ) -> ScrapeReport {
        let total = events.len();
        let events = filter_and_sort(events, session.today(), self.config.window_days);
        tracing::info!(
            "Scrape finished: {} events in window ({} found), {} failed sources",
            events.len(),
            total,
            errors.len()
        );
        ScrapeReport { events, errors }
    }
}
