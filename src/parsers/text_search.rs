//! Schedule mining under a marker heading
//!
//! Small brewery sites often publish their truck schedule as plain paragraphs
//! under a heading, one `Thursday, 7/3: Tisket Tasket` line per visit. No
//! times are listed, so events from this strategy are untimed.

use crate::models::{Event, Source};
use crate::parsers::dates::resolve_month_day;
use crate::parsers::{
    clean_text, configured_category, filter_valid_events, EventParser, ParseFailure, ScrapeSession,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

pub const DEFAULT_MARKER: &str = "UPCOMING FOOD TRUCKS";

const CONTAINER_TAGS: &[&str] = &["section", "div", "body"];

static SCHEDULE_LINE: OnceLock<Option<Regex>> = OnceLock::new();

fn schedule_line() -> Option<&'static Regex> {
    SCHEDULE_LINE
        .get_or_init(|| {
            Regex::new(
                r"^(Monday|Tuesday|Wednesday|Thursday|Friday|Saturday|Sunday)\s*,\s*(\d{1,2})/(\d{1,2})\s*:\s*(.+)$",
            )
            .ok()
        })
        .as_ref()
}

/// Parses one `Weekday, M/D: Name` line
fn parse_line(line: &str, source: &Source, today: NaiveDate) -> Option<Event> {
    let caps = schedule_line()?.captures(line.trim())?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;

    let Some(date) = resolve_month_day(month, day, today) else {
        tracing::debug!("Could not parse date in line: {}", line);
        return None;
    };

    let title = caps[4].trim();
    if title.is_empty() {
        return None;
    }
    Some(Event::new(source, title, date))
}

/// Finds the nearest section, div, or body enclosing the marker text
fn find_container<'a>(document: &'a Html, marker: &str) -> Option<ElementRef<'a>> {
    let text_node = document
        .tree
        .root()
        .descendants()
        .find(|node| node.value().as_text().is_some_and(|text| text.contains(marker)))?;

    text_node
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|element| CONTAINER_TAGS.contains(&element.value().name()))
}

/// Extracts schedule lines from the container holding `marker`
///
/// Returns `None` when the marker does not appear on the page.
pub(crate) fn extract_schedule(
    document: &Html,
    source: &Source,
    marker: &str,
    today: NaiveDate,
) -> Result<Option<Vec<Event>>, ParseFailure> {
    let Some(container) = find_container(document, marker) else {
        return Ok(None);
    };

    let lines = Selector::parse("p, li")
        .map_err(|e| ParseFailure::content(format!("Invalid selector: {e:?}")))?;
    let category = configured_category(source);

    let events = container
        .select(&lines)
        .map(|element| clean_text(&element.text().collect::<String>()))
        .filter(|text| !text.is_empty() && !text.contains(marker))
        .filter_map(|text| {
            let event = parse_line(&text, source, today);
            if event.is_none() {
                tracing::debug!("Line doesn't match pattern: {}", text);
            }
            event
        })
        .map(|event| event.with_category(category))
        .collect();

    Ok(Some(events))
}

/// Mines `Weekday, M/D: Name` lines below a marker heading
///
/// The marker defaults to [`DEFAULT_MARKER`] and can be changed with the
/// `marker` option.
pub struct TextSearchParser {
    source: Source,
}

impl TextSearchParser {
    pub const KEY: &'static str = "text_search";

    pub fn new(source: Source) -> Self {
        Self { source }
    }

    fn marker(&self) -> &str {
        self.source.config_str("marker").unwrap_or(DEFAULT_MARKER)
    }
}

#[async_trait]
impl EventParser for TextSearchParser {
    fn name(&self) -> &str {
        Self::KEY
    }

    async fn parse(&self, session: &ScrapeSession) -> Result<Vec<Event>, ParseFailure> {
        let today = session.today();
        let marker = self.marker();

        let document = session.fetch_page(&self.source.url).await?;
        let Some(events) = extract_schedule(&document, &self.source, marker, today)? else {
            tracing::warn!("Could not find '{}' section on {}", marker, self.source.url);
            return Ok(Vec::new());
        };

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
