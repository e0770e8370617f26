//! JSON payload for the published site

use crate::config::ScraperConfig;
use crate::models::{Event, EventCategory};
use crate::scraper::ScrapeReport;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Marker appended to names that came from image analysis
const VISION_MARKER: &str = "🖼️🤖";

/// Renders a time like `7:30 PM PT`
pub fn format_time(time: NaiveDateTime, label: &str) -> String {
    format!("{} {}", time.format("%-I:%M %p"), label)
}

/// One event as published
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebEvent {
    /// `YYYY-MM-DD`
    pub date: String,
    pub title: String,
    pub source: String,
    pub source_key: String,
    pub category: EventCategory,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub doors_time: Option<String>,
    pub description: Option<String>,
    pub age_restriction: Option<String>,
    pub ticket_url: Option<String>,
    pub price: Option<String>,

    /// `"vision"` when the title came from image analysis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_method: Option<String>,
}

impl WebEvent {
    pub fn from_event(event: &Event, label: &str) -> Self {
        let (title, extraction_method) = if event.ai_generated_name {
            (
                format!("{} {}", event.title, VISION_MARKER),
                Some("vision".to_string()),
            )
        } else {
            (event.title.clone(), None)
        };

        Self {
            date: event.date.format("%Y-%m-%d").to_string(),
            title,
            source: event.source_name.clone(),
            source_key: event.source_key.clone(),
            category: event.category,
            start_time: event.start_time.map(|t| format_time(t, label)),
            end_time: event.end_time.map(|t| format_time(t, label)),
            doors_time: event.doors_time.map(|t| format_time(t, label)),
            description: event.description.clone(),
            age_restriction: event.age_restriction.clone(),
            ticket_url: event.ticket_url.clone(),
            price: event.price.clone(),
            extraction_method,
        }
    }
}

/// The `data.json` document consumed by the site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebPayload {
    pub events: Vec<WebEvent>,

    /// ISO-8601 UTC timestamp of the run
    pub updated: String,

    pub total_events: usize,

    /// Short zone label, e.g. `PT`
    pub timezone: String,

    pub timezone_note: String,

    /// Deduplicated user-facing error lines
    pub errors: Vec<String>,
}

impl WebPayload {
    /// Builds the payload
    ///
    /// # Arguments
    ///
    /// * `events` - Filtered and sorted events
    /// * `errors` - User-facing error lines; repeats are dropped
    /// * `config` - Supplies the zone label and name
    /// * `updated` - Run timestamp
    pub fn new(
        events: &[Event],
        errors: Vec<String>,
        config: &ScraperConfig,
        updated: DateTime<Utc>,
    ) -> Self {
        let label = config.timezone_label.as_str();
        let events: Vec<WebEvent> = events
            .iter()
            .map(|event| WebEvent::from_event(event, label))
            .collect();

        let mut unique = Vec::with_capacity(errors.len());
        for message in errors {
            if !unique.contains(&message) {
                unique.push(message);
            }
        }

        Self {
            total_events: events.len(),
            events,
            updated: updated.to_rfc3339_opts(SecondsFormat::Secs, true),
            timezone: config.timezone_label.clone(),
            timezone_note: format!(
                "All event times are in {} ({}).",
                config.timezone_name, config.timezone_label
            ),
            errors: unique,
        }
    }

    /// Builds the payload for a finished run, stamped now
    pub fn from_report(report: &ScrapeReport, config: &ScraperConfig) -> Self {
        Self::new(&report.events, report.user_messages(), config, Utc::now())
    }
}
