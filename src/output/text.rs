//! Terminal rendering of a run

use crate::models::{Event, EventCategory};
use crate::scraper::ScrapingError;
use chrono::NaiveDate;
use std::collections::HashSet;

fn icon(category: EventCategory) -> &'static str {
    match category {
        EventCategory::Food => "🚚",
        EventCategory::Music => "🎵",
        EventCategory::Community => "🎪",
    }
}

fn time_suffix(event: &Event) -> String {
    let Some(start) = event.start_time else {
        return String::new();
    };
    match event.end_time {
        Some(end) => format!(" {} - {}", start.format("%I:%M %p"), end.format("%I:%M %p")),
        None => format!(" {}", start.format("%I:%M %p")),
    }
}

/// Formats events grouped by day, followed by a failure summary
///
/// # Arguments
///
/// * `events` - Filtered and sorted events
/// * `errors` - Per-source failures from the same run
///
/// # Returns
///
/// The text shown on the terminal. Total failure, partial failure, and an
/// empty but successful run each get their own wording.
pub fn format_events_text(events: &[Event], errors: &[ScrapingError]) -> String {
    let mut lines = Vec::new();

    if !events.is_empty() {
        lines.push(format!("Found {} events:", events.len()));
        lines.push(String::new());

        let mut current: Option<NaiveDate> = None;
        for event in events {
            if current != Some(event.date) {
                if current.is_some() {
                    lines.push(String::new());
                }
                lines.push(format!("📅 {}", event.date.format("%A, %B %d, %Y")));
                current = Some(event.date);
            }

            let vision = if event.ai_generated_name { " 🖼️🤖" } else { "" };
            lines.push(format!(
                "  {} {}{} @ {}{}",
                icon(event.category),
                event.title,
                vision,
                event.source_name,
                time_suffix(event)
            ));
            if let Some(age) = &event.age_restriction {
                lines.push(format!("     Ages: {age}"));
            }
            if let Some(description) = &event.description {
                lines.push(format!("     {description}"));
            }
            if let Some(ticket_url) = &event.ticket_url {
                lines.push(format!("     Tickets: {ticket_url}"));
            }
        }
    }

    if !errors.is_empty() {
        if events.is_empty() {
            lines.push("❌ No events found - all sources failed".to_string());
        } else {
            lines.push(String::new());
            lines.push("⚠️  Processing Summary:".to_string());
            lines.push(format!("✅ {} events found successfully", events.len()));
            lines.push(format!("❌ {} sources failed", errors.len()));
        }

        lines.push(String::new());
        lines.push("❌ Errors:".to_string());
        let mut seen = HashSet::new();
        for error in errors {
            let line = format!("  • {}: {}", error.source.name, error.message);
            if seen.insert(line.clone()) {
                lines.push(line);
            }
        }
    }

    if events.is_empty() && errors.is_empty() {
        lines.push("No events found for the upcoming week.".to_string());
    }

    lines.join("\n")
}
