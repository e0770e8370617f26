//! Calendar APIs that answer a date-range query with JSON
//!
//! `parser_config` options:
//!
//! | Option | Default | Meaning |
//! |--------|---------|---------|
//! | `api_url` | source `url` | Endpoint to query |
//! | `query` | none | Static query parameters (object) |
//! | `start_param` / `end_param` | none | Parameters receiving the date range |
//! | `date_format` | `%Y-%m-%d` | chrono format for the range values |
//! | `days_ahead` | `7` | Range end, in days after today |
//! | `events_pointer` | root | JSON pointer to the event array |
//! | `title_field` | `name` | Key, or JSON pointer when it starts with `/` |
//! | `start_field` | `start_time` | ISO-8601 start |
//! | `end_field` | `end_time` | ISO-8601 end |
//! | `description_field` | none | Free text description |
//! | `url_field` | none | Ticket / details link |

use crate::models::{Event, Source};
use crate::parsers::dates::parse_iso;
use crate::parsers::{
    clean_text, configured_category, filter_valid_events, EventParser, ParseFailure, ScrapeSession,
};
use async_trait::async_trait;
use chrono::format::{Item, StrftimeItems};
use chrono::{Days, FixedOffset, NaiveDate};
use serde_json::Value;

const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";
const DEFAULT_DAYS_AHEAD: u64 = 7;
const PLACEHOLDER_NAMES: [&str; 4] = ["tbd", "tba", "to be announced", "unknown"];

/// Reads a field by key, or by JSON pointer when it starts with `/`
fn field<'a>(item: &'a Value, name: &str) -> Option<&'a Value> {
    if name.starts_with('/') {
        item.pointer(name)
    } else {
        item.get(name)
    }
}

fn field_str<'a>(item: &'a Value, name: &str) -> Option<&'a str> {
    field(item, name).and_then(Value::as_str)
}

/// Formats a date, or `None` when the format string is malformed
fn format_date(date: NaiveDate, format: &str) -> Option<String> {
    let items = StrftimeItems::new(format);
    if items.clone().any(|item| matches!(item, Item::Error)) {
        return None;
    }
    Some(date.format_with_items(items).to_string())
}

/// Renders a query value the way it appears in a URL
fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Queries a JSON calendar endpoint for the coming days
pub struct JsonApiParser {
    source: Source,
}

impl JsonApiParser {
    pub const KEY: &'static str = "json_api";

    pub fn new(source: Source) -> Self {
        Self { source }
    }

    fn option<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.source.config_str(name).unwrap_or(default)
    }

    /// Static parameters followed by the date range
    fn query(&self, today: NaiveDate) -> Result<Vec<(&str, String)>, ParseFailure> {
        let mut query: Vec<(&str, String)> = self
            .source
            .parser_config
            .get("query")
            .and_then(Value::as_object)
            .map(|params| {
                params
                    .iter()
                    .map(|(name, value)| (name.as_str(), query_value(value)))
                    .collect()
            })
            .unwrap_or_default();

        let format = self.option("date_format", DEFAULT_DATE_FORMAT);
        let days_ahead = self.source.config_u64("days_ahead").unwrap_or(DEFAULT_DAYS_AHEAD);
        let end = today.checked_add_days(Days::new(days_ahead)).unwrap_or(today);
        let range = [("start_param", today), ("end_param", end)];

        for (option, date) in range {
            let Some(name) = self.source.config_str(option) else {
                continue;
            };
            let value = format_date(date, format).ok_or_else(|| {
                ParseFailure::content(format!(
                    "Invalid date_format '{}' for {}",
                    format, self.source.key
                ))
            })?;
            query.push((name, value));
        }
        Ok(query)
    }

    /// Locates the event array in a response body
    fn event_items<'a>(&self, body: &'a Value) -> Result<&'a [Value], ParseFailure> {
        let found = match self.source.config_str("events_pointer") {
            Some(pointer) => body.pointer(pointer),
            None => Some(body),
        };

        match found {
            Some(Value::Array(items)) => Ok(items.as_slice()),
            Some(Value::Null) => Ok(&[][..]),
            _ => Err(ParseFailure::content(format!(
                "No event list in API response for {}",
                self.source.key
            ))),
        }
    }

    fn to_event(&self, item: &Value, reference: FixedOffset) -> Option<Event> {
        let title = clean_text(field_str(item, self.option("title_field", "name"))?);
        if PLACEHOLDER_NAMES.contains(&title.to_lowercase().as_str()) {
            tracing::debug!("Skipping placeholder name '{}' for {}", title, self.source.name);
            return None;
        }

        let (date, start) = parse_iso(field_str(item, self.option("start_field", "start_time"))?, reference)?;
        let end = field_str(item, self.option("end_field", "end_time"))
            .and_then(|raw| parse_iso(raw, reference))
            .and_then(|(_, end)| end);

        if let (Some(start), Some(end)) = (start, end) {
            if end <= start {
                tracing::warn!(
                    "Invalid time range for '{}' at {}: {} to {}",
                    title,
                    self.source.name,
                    start,
                    end
                );
                return None;
            }
        }

        let description = self
            .source
            .config_str("description_field")
            .and_then(|name| field_str(item, name))
            .map(clean_text);
        let ticket_url = self
            .source
            .config_str("url_field")
            .and_then(|name| field_str(item, name))
            .map(str::to_string);

        Some(
            Event::new(&self.source, title, date)
                .with_times(start, end)
                .with_description(description)
                .with_ticket(ticket_url, None),
        )
    }
}

#[async_trait]
impl EventParser for JsonApiParser {
    fn name(&self) -> &str {
        Self::KEY
    }

    async fn parse(&self, session: &ScrapeSession) -> Result<Vec<Event>, ParseFailure> {
        let today = session.today();
        let url = self.option("api_url", &self.source.url);
        let query = self.query(today)?;

        let body = session.fetch_json(url, &query).await?;
        let items = self.event_items(&body)?;

        let category = configured_category(&self.source);
        let events: Vec<Event> = items
            .iter()
            .filter_map(|item| self.to_event(item, session.reference_offset()))
            .map(|event| event.with_category(category))
            .collect();

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
