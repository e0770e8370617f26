//! CSS-selector extraction configured per source
//!
//! `parser_config` options:
//!
//! | Option | Default | Meaning |
//! |--------|---------|---------|
//! | `event_selector` | (required) | One element per event |
//! | `title_selector` | `h1, h2, h3, h4, .title` | Title inside the event element |
//! | `date_selector` | `time, .date` | Date inside the event element |
//! | `date_attr` | none | Read the date from this attribute instead of the text |
//! | `time_selector` | none | Time or time range |
//! | `description_selector` | none | Free text description |
//! | `link_selector` | `a[href]` | Ticket / details link |

use crate::models::{Event, Source};
use crate::parsers::dates::{parse_date_text, parse_iso, parse_time, parse_time_range};
use crate::parsers::{
    clean_text, configured_category, filter_valid_events, EventParser, ParseFailure, ScrapeSession,
};
use async_trait::async_trait;
use chrono::{FixedOffset, NaiveDate};
use scraper::{ElementRef, Html, Selector};
use url::Url;

const DEFAULT_TITLE_SELECTOR: &str = "h1, h2, h3, h4, .title";
const DEFAULT_DATE_SELECTOR: &str = "time, .date";
const DEFAULT_LINK_SELECTOR: &str = "a[href]";

fn parse_selector(s: &str) -> Result<Selector, ParseFailure> {
    Selector::parse(s).map_err(|e| ParseFailure::content(format!("Invalid selector '{s}': {e:?}")))
}

fn optional_selector(source: &Source, option: &str) -> Result<Option<Selector>, ParseFailure> {
    source.config_str(option).map(parse_selector).transpose()
}

/// Compiled selector rules for one source
#[derive(Debug)]
pub(crate) struct SelectorRules {
    event: Selector,
    title: Selector,
    date: Selector,
    date_attr: Option<String>,
    time: Option<Selector>,
    description: Option<Selector>,
    link: Selector,
}

impl SelectorRules {
    /// Compiles the rules, or returns `None` when no `event_selector` is configured
    pub(crate) fn from_source(source: &Source) -> Result<Option<Self>, ParseFailure> {
        let Some(event) = source.config_str("event_selector") else {
            return Ok(None);
        };

        Ok(Some(Self {
            event: parse_selector(event)?,
            title: parse_selector(source.config_str("title_selector").unwrap_or(DEFAULT_TITLE_SELECTOR))?,
            date: parse_selector(source.config_str("date_selector").unwrap_or(DEFAULT_DATE_SELECTOR))?,
            date_attr: source.config_str("date_attr").map(str::to_string),
            time: optional_selector(source, "time_selector")?,
            description: optional_selector(source, "description_selector")?,
            link: parse_selector(source.config_str("link_selector").unwrap_or(DEFAULT_LINK_SELECTOR))?,
        }))
    }

    /// Extracts every event element that yields a title and a date
    pub(crate) fn extract(
        &self,
        document: &Html,
        source: &Source,
        today: NaiveDate,
        reference: FixedOffset,
    ) -> Vec<Event> {
        let base_url = Url::parse(&source.url).ok();
        let category = configured_category(source);

        document
            .select(&self.event)
            .filter_map(|element| {
                let event = self.extract_one(element, source, base_url.as_ref(), today, reference)?;
                Some(event.with_category(category))
            })
            .collect()
    }

    fn extract_one(
        &self,
        element: ElementRef<'_>,
        source: &Source,
        base_url: Option<&Url>,
        today: NaiveDate,
        reference: FixedOffset,
    ) -> Option<Event> {
        let title = clean_text(&element.select(&self.title).next()?.text().collect::<String>());
        if title.is_empty() {
            return None;
        }

        let date_element = element.select(&self.date).next()?;
        let raw_date = match &self.date_attr {
            Some(attr) => date_element.value().attr(attr)?.to_string(),
            None => date_element.text().collect(),
        };

        let (date, iso_time) = match parse_iso(&raw_date, reference) {
            Some(parsed) => parsed,
            None => (parse_date_text(&raw_date, today)?, None),
        };

        let time_text = self
            .time
            .as_ref()
            .and_then(|sel| element.select(sel).next())
            .map(|el| el.text().collect::<String>());

        let (start, end) = match time_text.as_deref() {
            Some(text) => match parse_time_range(text) {
                Some((start, end)) => (Some(date.and_time(start)), Some(date.and_time(end))),
                None => (parse_time(text).map(|t| date.and_time(t)), None),
            },
            None => (iso_time, None),
        };

        let description = self
            .description
            .as_ref()
            .and_then(|sel| element.select(sel).next())
            .map(|el| clean_text(&el.text().collect::<String>()));

        let ticket_url = element
            .select(&self.link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| match base_url {
                Some(base) => base.join(href).ok().map(|u| u.to_string()),
                None => Some(href.to_string()),
            });

        Some(
            Event::new(source, title, date)
                .with_times(start, end)
                .with_description(description)
                .with_ticket(ticket_url, None),
        )
    }
}

/// Extracts events with CSS selectors from `parser_config`
pub struct SelectorParser {
    source: Source,
}

impl SelectorParser {
    pub const KEY: &'static str = "html_selectors";

    pub fn new(source: Source) -> Self {
        Self { source }
    }
}

#[async_trait]
impl EventParser for SelectorParser {
    fn name(&self) -> &str {
        Self::KEY
    }

    async fn parse(&self, session: &ScrapeSession) -> Result<Vec<Event>, ParseFailure> {
        let rules = SelectorRules::from_source(&self.source)?.ok_or_else(|| {
            ParseFailure::content(format!(
                "No event_selector configured for {}",
                self.source.key
            ))
        })?;

        let today = session.today();
        let document = session.fetch_page(&self.source.url).await?;
        let events = rules.extract(&document, &self.source, today, session.reference_offset());

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
