use crate::models::Source;
use chrono::FixedOffset;
use serde::Deserialize;
use std::time::Duration;

/// User agent sent with every request
pub const DEFAULT_USER_AGENT: &str = "Around-the-Grounds Event Scraper";

/// Contents of a sources file
///
/// Brewery and venue sites use different list names; all of them load into
/// the same [`Source`] shape.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourcesFile {
    #[serde(default)]
    pub venues: Vec<Source>,

    #[serde(default)]
    pub breweries: Vec<Source>,

    #[serde(default)]
    pub sources: Vec<Source>,

    /// Optional overrides for the scraper settings
    #[serde(default)]
    pub scraper: ScraperConfig,
}

impl SourcesFile {
    /// All configured sources, venues first, then breweries, then generic sources
    pub fn sources(&self) -> Vec<Source> {
        self.venues
            .iter()
            .chain(&self.breweries)
            .chain(&self.sources)
            .cloned()
            .collect()
    }
}

/// Scraper behavior configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Maximum number of simultaneous HTTP connections across all sources
    pub max_concurrent: usize,

    /// Total timeout for one HTTP request, in seconds
    pub timeout_secs: u64,

    /// Attempts per source before giving up on retryable failures
    pub max_retries: u32,

    /// Backoff before the second attempt; doubles for each further attempt
    pub retry_base_delay_ms: u64,

    /// Days after today that are still kept by the window filter
    pub window_days: u32,

    /// Fixed UTC offset of the zone that decides what "today" is
    pub reference_utc_offset_hours: i32,

    /// Short zone label shown next to times (e.g. "PT")
    pub timezone_label: String,

    /// Long zone name used in the published timezone note
    pub timezone_name: String,

    pub user_agent: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 5,
            timeout_secs: 60,
            max_retries: 3,
            retry_base_delay_ms: 1000,
            window_days: 7,
            reference_utc_offset_hours: -8,
            timezone_label: "PT".to_string(),
            timezone_name: "Pacific Time".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ScraperConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    /// The reference zone, or `None` if the offset is out of range
    pub fn reference_offset(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.reference_utc_offset_hours.checked_mul(3600)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScraperConfig::default();
        assert_eq!(config.max_concurrent, 5);
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_base_delay(), Duration::from_secs(1));
        assert_eq!(config.window_days, 7);
        assert_eq!(
            config.reference_offset(),
            FixedOffset::west_opt(8 * 3600)
        );
    }

    #[test]
    fn test_out_of_range_offset() {
        let config = ScraperConfig {
            reference_utc_offset_hours: 30,
            ..ScraperConfig::default()
        };
        assert!(config.reference_offset().is_none());
    }

    #[test]
    fn test_sources_concatenates_lists_in_order() {
        let file = SourcesFile {
            venues: vec![Source::new("littlefield", "Littlefield", "https://a.example")],
            breweries: vec![Source::new("obec-brewing", "Obec", "https://b.example")],
            sources: vec![Source::new("market", "Market", "https://c.example")],
            scraper: ScraperConfig::default(),
        };

        let keys: Vec<_> = file.sources().into_iter().map(|s| s.key).collect();
        assert_eq!(keys, vec!["littlefield", "obec-brewing", "market"]);
    }
}
