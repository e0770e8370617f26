use crate::models::Event;
use chrono::{Days, NaiveDate};

/// Keeps events dated within `[today, today + window_days]` and sorts them
///
/// Both ends of the window are inclusive. The sort is stable and orders by
/// [`Event::sort_key`], so untimed events come first on their day.
pub fn filter_and_sort(events: Vec<Event>, today: NaiveDate, window_days: u32) -> Vec<Event> {
    let last = today
        .checked_add_days(Days::new(u64::from(window_days)))
        .unwrap_or(NaiveDate::MAX);

    let mut kept: Vec<Event> = events
        .into_iter()
        .filter(|event| event.date >= today && event.date <= last)
        .collect();
    kept.sort_by_key(Event::sort_key);
    kept
}
