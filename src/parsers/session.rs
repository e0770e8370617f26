//! HTTP session shared by every parser in a scrape run
//!
//! A session bundles:
//! - One `reqwest` client with the fixed user agent and total request timeout
//! - A connection semaphore that caps simultaneous requests across all tasks
//! - The reference zone that decides what "today" means

use crate::config::ScraperConfig;
use crate::parsers::ParseFailure;
use crate::SetupError;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use reqwest::Client;
use scraper::Html;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// A live HTTP session handed to [`crate::parsers::EventParser::parse`]
///
/// Cloning is cheap and clones share the same connection cap.
#[derive(Debug, Clone)]
pub struct ScrapeSession {
    client: Client,
    connections: Arc<Semaphore>,
    reference_offset: FixedOffset,
}

impl ScrapeSession {
    /// Wraps an existing client
    pub fn new(client: Client, max_connections: usize, reference_offset: FixedOffset) -> Self {
        Self {
            client,
            connections: Arc::new(Semaphore::new(max_connections.max(1))),
            reference_offset,
        }
    }

    /// Builds a session from scraper settings
    ///
    /// # Arguments
    ///
    /// * `config` - User agent, timeout and reference zone
    /// * `max_connections` - Simultaneous requests allowed through this session
    ///
    /// # Returns
    ///
    /// * `Ok(ScrapeSession)` - Ready to use
    /// * `Err(SetupError)` - The client could not be built or the zone is invalid
    pub fn from_config(config: &ScraperConfig, max_connections: usize) -> Result<Self, SetupError> {
        let reference_offset = config.reference_offset().ok_or_else(|| {
            SetupError::Settings(format!(
                "reference offset of {} hours is out of range",
                config.reference_utc_offset_hours
            ))
        })?;

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self::new(client, max_connections, reference_offset))
    }

    pub fn reference_offset(&self) -> FixedOffset {
        self.reference_offset
    }

    /// Current time in the reference zone
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.reference_offset)
    }

    /// Current calendar day in the reference zone
    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// Fetches a URL and returns its body
    ///
    /// # Error Mapping
    ///
    /// | Condition | Failure |
    /// |-----------|---------|
    /// | Request exceeded the total timeout | `Timeout` |
    /// | Connection, TLS, or body read error | `Network` |
    /// | Non-2xx status | `Status` |
    /// | Empty body | `Content` |
    pub async fn fetch_text(&self, url: &str) -> Result<String, ParseFailure> {
        self.get_body(url, &[]).await
    }

    /// Queries a JSON endpoint
    ///
    /// `query` pairs are appended to the URL's query string. Failures map as
    /// in [`Self::fetch_text`]; a body that is not JSON is a `Content` failure.
    pub async fn fetch_json(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Value, ParseFailure> {
        let body = self.get_body(url, query).await?;
        serde_json::from_str(&body)
            .map_err(|e| ParseFailure::Content(format!("Invalid JSON response from {url}: {e}")))
    }

    async fn get_body(&self, url: &str, query: &[(&str, String)]) -> Result<String, ParseFailure> {
        // Held until the body has been read
        let _permit = self
            .connections
            .acquire()
            .await
            .map_err(|e| ParseFailure::Unexpected(anyhow::anyhow!("connection pool closed: {e}")))?;

        tracing::debug!("Fetching page: {} {:?}", url, query);

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| ParseFailure::from_transport(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ParseFailure::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ParseFailure::from_transport(url, e))?;

        if body.trim().is_empty() {
            return Err(ParseFailure::Content(format!("Empty response from: {url}")));
        }

        Ok(body)
    }

    /// Fetches a URL and parses it into an HTML document
    ///
    /// Malformed markup is tolerated; only transport and status problems fail.
    pub async fn fetch_page(&self, url: &str) -> Result<Html, ParseFailure> {
        let body = self.fetch_text(url).await?;
        let document = Html::parse_document(&body);
        Ok(document)
    }
}
