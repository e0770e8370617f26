//! Parser registry: maps a source's parser key to its implementation

use crate::models::Source;
use crate::parsers::{
    EventParser, JsonApiParser, JsonLdParser, MonthlyCalendarParser, SelectorParser,
    TextSearchParser,
};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Builds a parser bound to one source
pub type ParserFactory = Arc<dyn Fn(&Source) -> Box<dyn EventParser> + Send + Sync>;

/// Registry lookup errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("No parser found for key: {key}")]
    NotRegistered { key: String },
}

/// Ordered mapping from parser key to parser factory
///
/// Keys are case-sensitive. Registering an existing key replaces its factory
/// in place, so the last registration wins without changing the order.
#[derive(Clone, Default)]
pub struct ParserRegistry {
    entries: Vec<(String, ParserFactory)>,
}

impl ParserRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in extraction strategies
    ///
    /// | Key | Strategy |
    /// |-----|----------|
    /// | `json_ld` | schema.org events embedded in the page, selector fallback |
    /// | `html_selectors` | CSS selectors from `parser_config` |
    /// | `text_search` | `Weekday, M/D: Name` lines under a marker heading |
    /// | `monthly_calendar` | `json_ld` over several month pages |
    /// | `json_api` | JSON calendar endpoint queried for a date range |
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(JsonLdParser::KEY, |source| Box::new(JsonLdParser::new(source.clone())));
        registry.register(SelectorParser::KEY, |source| {
            Box::new(SelectorParser::new(source.clone()))
        });
        registry.register(TextSearchParser::KEY, |source| {
            Box::new(TextSearchParser::new(source.clone()))
        });
        registry.register(MonthlyCalendarParser::KEY, |source| {
            Box::new(MonthlyCalendarParser::new(source.clone()))
        });
        registry.register(JsonApiParser::KEY, |source| Box::new(JsonApiParser::new(source.clone())));
        registry
    }

    /// Registers a parser factory under `key`
    pub fn register<F>(&mut self, key: impl Into<String>, factory: F)
    where
        F: Fn(&Source) -> Box<dyn EventParser> + Send + Sync + 'static,
    {
        let key = key.into();
        let factory: ParserFactory = Arc::new(factory);

        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = factory,
            None => self.entries.push((key, factory)),
        }
    }

    /// Looks up the factory registered under `key`
    pub fn get(&self, key: &str) -> Result<ParserFactory, RegistryError> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, factory)| Arc::clone(factory))
            .ok_or_else(|| RegistryError::NotRegistered {
                key: key.to_string(),
            })
    }

    /// Instantiates the parser for `source`, looked up by [`Source::parser_key`]
    pub fn create(&self, source: &Source) -> Result<Box<dyn EventParser>, RegistryError> {
        let factory = self.get(source.parser_key())?;
        Ok(factory(source))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(existing, _)| existing == key)
    }

    /// Registered keys in registration order
    pub fn supported_keys(&self) -> Vec<&str> {
        self.entries.iter().map(|(key, _)| key.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserRegistry")
            .field("keys", &self.supported_keys())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Event;
    use crate::parsers::{ParseFailure, ScrapeSession};
    use async_trait::async_trait;

    struct NamedParser(&'static str);

    #[async_trait]
    impl EventParser for NamedParser {
        fn name(&self) -> &str {
            self.0
        }

        async fn parse(&self, _session: &ScrapeSession) -> Result<Vec<Event>, ParseFailure> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_builtin_keys() {
        let registry = ParserRegistry::with_builtin();
        assert_eq!(
            registry.supported_keys(),
            vec!["json_ld", "html_selectors", "text_search", "monthly_calendar", "json_api"]
        );
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_get_unknown_key() {
        let registry = ParserRegistry::with_builtin();
        let err = registry.get("nonexistent-brewery").err().unwrap();
        assert_eq!(
            err,
            RegistryError::NotRegistered {
                key: "nonexistent-brewery".to_string()
            }
        );
        assert_eq!(err.to_string(), "No parser found for key: nonexistent-brewery");
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let registry = ParserRegistry::with_builtin();
        assert!(registry.contains("json_ld"));
        assert!(!registry.contains("JSON_LD"));
    }

    #[test]
    fn test_register_and_replace_keeps_order() {
        let mut registry = ParserRegistry::new();
        registry.register("first", |_| Box::new(NamedParser("one")));
        registry.register("second", |_| Box::new(NamedParser("two")));
        registry.register("first", |_| Box::new(NamedParser("replaced")));

        assert_eq!(registry.supported_keys(), vec!["first", "second"]);
        assert_eq!(registry.len(), 2);

        let source = Source::new("first", "First", "https://a.example");
        let parser = registry.create(&source).unwrap();
        assert_eq!(parser.name(), "replaced");
    }

    #[test]
    fn test_create_uses_parser_type() {
        let registry = ParserRegistry::with_builtin();
        let source =
            Source::new("wheelie-pop", "Wheelie Pop", "https://a.example").with_parser_type("text_search");
        let parser = registry.create(&source).unwrap();
        assert_eq!(parser.name(), "text_search");

        let unknown = Source::new("wheelie-pop", "Wheelie Pop", "https://a.example");
        assert!(registry.create(&unknown).is_err());
    }
}
