use crate::{day, json_ld_page};
use grounds_events::output::{write_preview, WebPayload};
use grounds_events::{load_sources, ParserRegistry, ScraperCoordinator};
use std::io::Write;
use std::sync::Arc;
use tempfile::{Builder, TempDir};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_config_file_to_preview() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(json_ld_page(&[("Marination", day(1))])))
        .mount(&server)
        .await;

    let json = format!(
        r#"{{
            "breweries": [
                {{"key": "urban-family", "name": "Urban Family Brewing", "url": "{}/urban", "parser_type": "json_ld"}}
            ],
            "scraper": {{"retry_base_delay_ms": 0, "reference_utc_offset_hours": 0, "timezone_label": "UTC", "timezone_name": "Coordinated Universal Time"}}
        }}"#,
        server.uri()
    );
    let mut file = Builder::new().suffix(".json").tempfile().unwrap();
    file.write_all(json.as_bytes()).unwrap();

    let loaded = load_sources(file.path()).unwrap();
    let coordinator = ScraperCoordinator::new(loaded.scraper.clone(), Arc::new(ParserRegistry::with_builtin()));
    let report = coordinator.scrape_all(&loaded.sources()).await.unwrap();
    assert_eq!(report.events.len(), 1);
    assert!(!report.has_errors());

    let payload = WebPayload::from_report(&report, &loaded.scraper);
    assert_eq!(payload.events[0].start_time.as_deref(), Some("7:00 PM UTC"));

    let out = TempDir::new().unwrap();
    let path = write_preview(out.path(), &payload).unwrap().unwrap();
    let written = std::fs::read_to_string(path).unwrap();
    assert!(written.contains("\"total_events\": 1"));
    assert!(written.contains("Urban Family Brewing"));
}

#[test]
fn test_missing_config_is_fatal() {
    let dir = TempDir::new().unwrap();
    let err = load_sources(&dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, grounds_events::ConfigError::NotFound(_)));
}
