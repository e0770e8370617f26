use crate::models::Source;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad kind of an event, used by the published site to pick wording
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    /// Food truck visiting a brewery
    #[default]
    Food,

    /// Concert or other performance at a music venue
    Music,

    /// Anything else (markets, family events, meetups)
    Community,
}

/// A normalized occurrence produced by a parser
///
/// Times are naive and expressed in the venue's local time. Events are created
/// during a single scrape call and never mutated after they leave the parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub source_key: String,
    pub source_name: String,

    /// Vendor or artist name
    pub title: String,

    /// Calendar day of the event
    pub date: NaiveDate,

    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,

    /// When doors open, for shows that list it separately
    pub doors_time: Option<NaiveDateTime>,

    pub description: Option<String>,
    pub age_restriction: Option<String>,
    pub ticket_url: Option<String>,
    pub price: Option<String>,

    #[serde(default)]
    pub category: EventCategory,

    /// Set when the title came from non-deterministic extraction (e.g. image
    /// analysis) rather than structured text
    #[serde(default)]
    pub ai_generated_name: bool,
}

impl Event {
    /// Creates an event for `source` with only the required fields set
    pub fn new(source: &Source, title: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            source_key: source.key.clone(),
            source_name: source.name.clone(),
            title: title.into(),
            date,
            start_time: None,
            end_time: None,
            doors_time: None,
            description: None,
            age_restriction: None,
            ticket_url: None,
            price: None,
            category: EventCategory::default(),
            ai_generated_name: false,
        }
    }

    pub fn with_times(mut self, start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Self {
        self.start_time = start;
        self.end_time = end;
        self
    }

    pub fn with_doors(mut self, doors: Option<NaiveDateTime>) -> Self {
        self.doors_time = doors;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description.filter(|d| !d.trim().is_empty());
        self
    }

    pub fn with_category(mut self, category: EventCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_ticket(mut self, ticket_url: Option<String>, price: Option<String>) -> Self {
        self.ticket_url = ticket_url;
        self.price = price;
        self
    }

    pub fn with_age_restriction(mut self, age: Option<String>) -> Self {
        self.age_restriction = age;
        self
    }

    pub fn with_ai_generated_name(mut self, flag: bool) -> Self {
        self.ai_generated_name = flag;
        self
    }

    /// Ordering key: date, then start time, with untimed events at midnight
    pub fn sort_key(&self) -> (NaiveDate, NaiveDateTime) {
        let start = self
            .start_time
            .unwrap_or_else(|| self.date.and_time(NaiveTime::MIN));
        (self.date, start)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.date.format("%Y-%m-%d"))?;
        if let Some(start) = self.start_time {
            write!(f, " {}", start.format("%H:%M"))?;
            if let Some(end) = self.end_time {
                write!(f, "-{}", end.format("%H:%M"))?;
            }
        }
        write!(f, ": {} @ {}", self.title, self.source_name)
    }
}
