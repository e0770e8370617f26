//! Integration tests for the scrape pipeline
//!
//! These tests use wiremock to stand in for venue websites and run the
//! coordinator end-to-end with the built-in parsers.

mod config_tests;
mod coordinator_tests;

use chrono::{Days, NaiveDate, Utc};
use grounds_events::ScraperConfig;

/// Settings for fast tests: UTC reference zone, no backoff
pub fn test_config() -> ScraperConfig {
    ScraperConfig {
        retry_base_delay_ms: 0,
        reference_utc_offset_hours: 0,
        timeout_secs: 5,
        ..ScraperConfig::default()
    }
}

/// Today in the UTC reference zone, shifted by `offset` days
pub fn day(offset: u64) -> NaiveDate {
    Utc::now()
        .date_naive()
        .checked_add_days(Days::new(offset))
        .expect("date in range")
}

/// A page embedding one JSON-LD `Event` per `(title, date)`
pub fn json_ld_page(events: &[(&str, NaiveDate)]) -> String {
    let items: Vec<String> = events
        .iter()
        .map(|(title, date)| {
            format!(r#"{{"@type": "Event", "name": "{title}", "startDate": "{date}T19:00:00"}}"#)
        })
        .collect();
    format!(
        r#"<html><head><script type="application/ld+json">[{}]</script></head><body></body></html>"#,
        items.join(",")
    )
}
