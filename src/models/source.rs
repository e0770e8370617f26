use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A scrape target: one brewery, venue, or other event listing
///
/// Breweries and venues are both loaded into this one shape, so the
/// coordinator never needs to know which domain a source came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    /// Unique identifier, also the default parser registry key
    pub key: String,

    /// Display name
    pub name: String,

    /// Page (or API endpoint) to fetch
    pub url: String,

    /// Registry key of a shared extraction strategy, overriding `key`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parser_type: Option<String>,

    /// Parser-specific options, forwarded verbatim to the parser
    #[serde(default)]
    pub parser_config: Map<String, Value>,
}

impl Source {
    /// Creates a source with an empty parser configuration
    pub fn new(key: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            url: url.into(),
            parser_type: None,
            parser_config: Map::new(),
        }
    }

    /// Selects a shared extraction strategy by registry key
    pub fn with_parser_type(mut self, parser_type: impl Into<String>) -> Self {
        self.parser_type = Some(parser_type.into());
        self
    }

    /// Adds one parser option
    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parser_config.insert(name.into(), value.into());
        self
    }

    /// The key used to look up this source's parser
    pub fn parser_key(&self) -> &str {
        self.parser_type.as_deref().unwrap_or(&self.key)
    }

    /// Reads a string parser option
    pub fn config_str(&self, name: &str) -> Option<&str> {
        self.parser_config.get(name).and_then(Value::as_str)
    }

    /// Reads a non-negative integer parser option
    pub fn config_u64(&self, name: &str) -> Option<u64> {
        self.parser_config.get(name).and_then(Value::as_u64)
    }

    /// Reads a boolean parser option
    pub fn config_bool(&self, name: &str) -> Option<bool> {
        self.parser_config.get(name).and_then(Value::as_bool)
    }
}
