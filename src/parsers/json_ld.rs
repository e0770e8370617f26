//! Structured-data extraction with an HTML fallback
//!
//! Many venue calendars embed schema.org events as JSON-LD. The coverage is
//! often partial, so when fewer than `min_structured_events` (default 5) events
//! come back, the page is also mined with the source's selector rules (see
//! [`SelectorParser`](super::SelectorParser)) and the results are merged.

use crate::models::{Event, Source};
use crate::parsers::dates::{parse_iso, parse_time};
use crate::parsers::selectors::SelectorRules;
use crate::parsers::{
    clean_text, configured_category, filter_valid_events, EventParser, ParseFailure, ScrapeSession,
};
use async_trait::async_trait;
use chrono::{FixedOffset, NaiveDate, NaiveDateTime};
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::OnceLock;

/// Below this many structured events the selector fallback also runs
const DEFAULT_MIN_STRUCTURED_EVENTS: u64 = 5;

const EVENT_TYPES: &[&str] = &["Event", "MusicEvent", "Festival", "FoodEvent"];

static TITLE_PREFIX: OnceLock<Option<Regex>> = OnceLock::new();

fn title_prefix() -> Option<&'static Regex> {
    TITLE_PREFIX
        .get_or_init(|| Regex::new(r"(?i)^(live at|concert at|show at|event:)\s+").ok())
        .as_ref()
}

/// Collects event objects from single objects, arrays, and `@graph` wrappers
fn collect_event_nodes<'a>(value: &'a Value, out: &mut Vec<&'a Map<String, Value>>) {
    match value {
        Value::Array(items) => items.iter().for_each(|item| collect_event_nodes(item, out)),
        Value::Object(object) => {
            if let Some(graph) = object.get("@graph") {
                collect_event_nodes(graph, out);
            }
            if is_event_type(object.get("@type")) {
                out.push(object);
            }
        }
        _ => {}
    }
}

fn is_event_type(value: Option<&Value>) -> bool {
    match value {
        Some(Value::String(kind)) => EVENT_TYPES.contains(&kind.as_str()),
        Some(Value::Array(kinds)) => kinds
            .iter()
            .filter_map(Value::as_str)
            .any(|kind| EVENT_TYPES.contains(&kind)),
        _ => false,
    }
}

/// First element of a value that may be a single item or a list
fn first_of(value: &Value) -> Option<&Value> {
    match value {
        Value::Array(items) => items.first(),
        other => Some(other),
    }
}

fn string_field<'a>(object: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
    object
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Performer name, when listed
fn performer_name(object: &Map<String, Value>) -> Option<String> {
    match first_of(object.get("performer")?)? {
        Value::Object(performer) => string_field(performer, "name").map(str::to_string),
        Value::String(name) => Some(name.trim().to_string()).filter(|n| !n.is_empty()),
        _ => None,
    }
}

fn strip_title_prefix(name: &str) -> String {
    match title_prefix() {
        Some(re) => re.replace(name, "").trim().to_string(),
        None => name.trim().to_string(),
    }
}

/// Normalizes a schema.org `typicalAgeRange` such as `21-` or `all ages`
fn age_restriction(range: &str) -> Option<String> {
    let range = range.trim();
    if range.is_empty() {
        None
    } else if range.contains("21") {
        Some("21+".to_string())
    } else if range.contains("18") {
        Some("18+".to_string())
    } else if range.to_ascii_lowercase().contains("all") {
        Some("All ages".to_string())
    } else {
        Some(range.to_string())
    }
}

fn price_text(offer: &Map<String, Value>) -> Option<String> {
    match offer.get("price").or_else(|| offer.get("priceRange"))? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parses a JSON-LD time field against the event's day
fn time_on(value: Option<&str>, date: NaiveDate, reference: FixedOffset) -> Option<NaiveDateTime> {
    let value = value?;
    match parse_iso(value, reference) {
        Some((_, Some(at))) => Some(at),
        _ => parse_time(value).map(|t| date.and_time(t)),
    }
}

fn event_from_node(
    object: &Map<String, Value>,
    source: &Source,
    reference: FixedOffset,
) -> Option<Event> {
    let name = string_field(object, "name")?;
    let title = performer_name(object).unwrap_or_else(|| strip_title_prefix(name));

    let (date, start) = parse_iso(string_field(object, "startDate")?, reference)?;
    let end = time_on(string_field(object, "endDate"), date, reference);
    let doors = time_on(string_field(object, "doorTime"), date, reference);

    let offer = object
        .get("offers")
        .and_then(first_of)
        .and_then(Value::as_object);
    let ticket_url = offer
        .and_then(|o| string_field(o, "url"))
        .or_else(|| string_field(object, "url"))
        .map(str::to_string);
    let price = offer.and_then(price_text);

    Some(
        Event::new(source, title, date)
            .with_times(start, end)
            .with_doors(doors)
            .with_description(string_field(object, "description").map(clean_text))
            .with_ticket(ticket_url, price)
            .with_age_restriction(string_field(object, "typicalAgeRange").and_then(age_restriction))
            .with_category(configured_category(source)),
    )
}

/// Extracts every schema.org event embedded in the page
///
/// Scripts that are not valid JSON are skipped.
pub(crate) fn extract_structured(document: &Html, source: &Source, reference: FixedOffset) -> Vec<Event> {
    let Ok(selector) = Selector::parse(r#"script[type="application/ld+json"]"#) else {
        return Vec::new();
    };

    let mut events = Vec::new();
    for script in document.select(&selector) {
        let raw: String = script.text().collect();
        let value: Value = match serde_json::from_str(raw.trim()) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!("Failed to parse JSON-LD for {}: {}", source.key, e);
                continue;
            }
        };

        let mut nodes = Vec::new();
        collect_event_nodes(&value, &mut nodes);
        events.extend(nodes.into_iter().filter_map(|node| event_from_node(node, source, reference)));
    }
    events
}

fn dedup_key(event: &Event) -> (String, NaiveDate) {
    (event.title.trim().to_lowercase(), event.date)
}

/// Structured extraction plus the selector fallback, deduplicated
///
/// # Arguments
///
/// * `document` - Parsed page
/// * `source` - Source whose `parser_config` holds the fallback selectors
/// * `today` - Current date in the reference zone, for year resolution
/// * `reference` - Reference zone for UTC timestamps
///
/// # Returns
///
/// Unvalidated events, structured ones first
pub(crate) fn extract_page(
    document: &Html,
    source: &Source,
    today: NaiveDate,
    reference: FixedOffset,
) -> Result<Vec<Event>, ParseFailure> {
    let mut events = extract_structured(document, source, reference);
    let threshold = source
        .config_u64("min_structured_events")
        .unwrap_or(DEFAULT_MIN_STRUCTURED_EVENTS);

    if (events.len() as u64) < threshold {
        if let Some(rules) = SelectorRules::from_source(source)? {
            tracing::debug!(
                "Only {} structured events for {}, trying HTML selectors",
                events.len(),
                source.key
            );
            events.extend(rules.extract(document, source, today, reference));
        }
    }

    let mut seen = HashSet::new();
    events.retain(|event| seen.insert(dedup_key(event)));
    Ok(events)
}

/// Reads schema.org events embedded as JSON-LD
pub struct JsonLdParser {
    source: Source,
}

impl JsonLdParser {
    pub const KEY: &'static str = "json_ld";

    pub fn new(source: Source) -> Self {
        Self { source }
    }
}

#[async_trait]
impl EventParser for JsonLdParser {
    fn name(&self) -> &str {
        Self::KEY
    }

    async fn parse(&self, session: &ScrapeSession) -> Result<Vec<Event>, ParseFailure> {
        let today = session.today();
        let reference = session.reference_offset();

        let document = session.fetch_page(&self.source.url).await?;
        let events = extract_page(&document, &self.source, today, reference)?;

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
