use crate::models::Event;
use chrono::{Days, NaiveDate};

/// Shortest accepted title, in characters, after trimming
const MIN_TITLE_CHARS: usize = 2;

/// Returns true if the event has the required fields and is not stale
///
/// Events dated yesterday are still accepted so that a scrape running just
/// after midnight in one zone does not drop events that are "today" at the
/// venue.
pub fn is_valid_event(event: &Event, today: NaiveDate) -> bool {
    if event.source_key.trim().is_empty() || event.source_name.trim().is_empty() {
        tracing::warn!("Event missing source info: {}", event);
        return false;
    }

    if event.title.trim().chars().count() < MIN_TITLE_CHARS {
        tracing::warn!("Event missing title: {}", event);
        return false;
    }

    let earliest = today.checked_sub_days(Days::new(1)).unwrap_or(today);
    if event.date < earliest {
        tracing::debug!("Event is in the past: {}", event);
        return false;
    }

    true
}

/// Keeps only valid events, preserving their order
pub fn filter_valid_events(events: Vec<Event>, today: NaiveDate) -> Vec<Event> {
    let total = events.len();
    let valid: Vec<Event> = events
        .into_iter()
        .filter(|event| is_valid_event(event, today))
        .collect();

    if valid.len() < total {
        tracing::debug!("Filtered out {} invalid events", total - valid.len());
    }

    valid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Source;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event(title: &str, day: NaiveDate) -> Event {
        Event::new(&Source::new("stoup-ballard", "Stoup", "https://a.example"), title, day)
    }

    #[test]
    fn test_valid_event() {
        let today = date(2025, 11, 2);
        assert!(is_valid_event(&event("Tisket Tasket", today), today));
    }

    #[test]
    fn test_short_or_empty_titles_rejected() {
        let today = date(2025, 11, 2);
        assert!(!is_valid_event(&event("", today), today));
        assert!(!is_valid_event(&event("   ", today), today));
        assert!(!is_valid_event(&event(" X ", today), today));
        assert!(is_valid_event(&event("XO", today), today));
    }

    #[test]
    fn test_missing_source_info_rejected() {
        let today = date(2025, 11, 2);
        let mut e = event("Tisket Tasket", today);
        e.source_key.clear();
        assert!(!is_valid_event(&e, today));

        let mut e = event("Tisket Tasket", today);
        e.source_name = " ".into();
        assert!(!is_valid_event(&e, today));
    }

    #[test]
    fn test_yesterday_kept_older_dropped() {
        let today = date(2025, 11, 2);
        assert!(is_valid_event(&event("Yesterday", date(2025, 11, 1)), today));
        assert!(!is_valid_event(&event("Two days ago", date(2025, 10, 31)), today));
    }

    #[test]
    fn test_filter_valid_events_preserves_order() {
        let today = date(2025, 11, 2);
        let events = vec![
            event("First", date(2025, 11, 5)),
            event("", date(2025, 11, 5)),
            event("Stale", date(2025, 10, 1)),
            event("Second", date(2025, 11, 3)),
        ];

        let valid = filter_valid_events(events, today);
        let titles: Vec<_> = valid.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second"]);
    }

    #[test]
    fn test_filter_valid_events_empty() {
        assert!(filter_valid_events(Vec::new(), date(2025, 11, 2)).is_empty());
    }
}
