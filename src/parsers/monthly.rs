//! Month-paged calendars
//!
//! Some ticketing calendars publish one page per month. The `url_template`
//! option names the page layout with `{year}` and `{month}` placeholders
//! (month zero-padded); the current month and `months_ahead` following
//! months are fetched concurrently and each page is read with the
//! structured-data extraction.

use crate::models::{Event, Source};
use crate::parsers::json_ld::extract_page;
use crate::parsers::{filter_valid_events, EventParser, ParseFailure, ScrapeSession};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use futures::future::join_all;
use std::collections::HashSet;

const DEFAULT_MONTHS_AHEAD: u64 = 1;
const MAX_MONTHS_AHEAD: u64 = 12;

/// `(year, month)` for `today`'s month and the `ahead` months after it
fn month_span(today: NaiveDate, ahead: u64) -> Vec<(i32, u32)> {
    let (mut year, mut month) = (today.year(), today.month());
    let mut months = Vec::new();
    for _ in 0..=ahead {
        months.push((year, month));
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }
    months
}

/// Expands `{year}` and `{month}` in a URL template
fn expand_template(template: &str, year: i32, month: u32) -> String {
    template
        .replace("{year}", &year.to_string())
        .replace("{month}", &format!("{month:02}"))
}

/// Reads several month pages of a calendar
pub struct MonthlyCalendarParser {
    source: Source,
}

impl MonthlyCalendarParser {
    pub const KEY: &'static str = "monthly_calendar";

    pub fn new(source: Source) -> Self {
        Self { source }
    }

    /// Month page URLs, or the source URL alone when no template is set
    fn month_urls(&self, today: NaiveDate) -> Vec<String> {
        let Some(template) = self.source.config_str("url_template") else {
            return vec![self.source.url.clone()];
        };

        let ahead = self
            .source
            .config_u64("months_ahead")
            .unwrap_or(DEFAULT_MONTHS_AHEAD);
        if ahead > MAX_MONTHS_AHEAD {
            tracing::warn!(
                "months_ahead {} for {} capped at {}",
                ahead,
                self.source.key,
                MAX_MONTHS_AHEAD
            );
        }
        let ahead = ahead.min(MAX_MONTHS_AHEAD);
        month_span(today, ahead)
            .into_iter()
            .map(|(year, month)| expand_template(template, year, month))
            .collect()
    }
}

#[async_trait]
impl EventParser for MonthlyCalendarParser {
    fn name(&self) -> &str {
        Self::KEY
    }

    async fn parse(&self, session: &ScrapeSession) -> Result<Vec<Event>, ParseFailure> {
        let today = session.today();
        let reference = session.reference_offset();
        let urls = self.month_urls(today);

        let pages = join_all(urls.iter().map(|url| async move {
            let events = session
                .fetch_page(url)
                .await
                .and_then(|document| extract_page(&document, &self.source, today, reference));
            (url, events)
        }))
        .await;

        let mut events = Vec::new();
        let mut failures = Vec::new();
        for (url, page) in pages {
            match page {
                Ok(found) => events.extend(found),
                Err(e) => {
                    tracing::warn!("Failed to load month page {}: {}", url, e);
                    failures.push(e);
                }
            }
        }

        if failures.len() == urls.len() {
            if let Some(failure) = failures.pop() {
                return Err(failure);
            }
        }

        // Adjacent month pages often repeat events near the boundary
        let mut seen = HashSet::new();
        events.retain(|event| seen.insert((event.title.to_lowercase(), event.date)));

        let total = events.len();
        let valid = filter_valid_events(events, today);
        tracing::info!(
            "Parsed {} valid events from {} total for {}",
            valid.len(),
            total,
            self.source.name
        );
        Ok(valid)
    }
}
