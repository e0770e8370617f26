use crate::{day, json_ld_page, test_config};
use chrono::Datelike;
use grounds_events::output::RunOutcome;
use grounds_events::{ErrorKind, ParserRegistry, ScraperConfig, ScraperCoordinator, Source};
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn coordinator(config: ScraperConfig) -> ScraperCoordinator {
    ScraperCoordinator::new(config, Arc::new(ParserRegistry::with_builtin()))
}

#[tokio::test]
async fn test_mixed_sources_end_to_end() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/littlefield"))
        .respond_with(ResponseTemplate::new(200).set_body_string(json_ld_page(&[
            ("Sunny Side", day(3)),
            ("The Dirty Dozen", day(1)),
            ("Far Future", day(30)),
        ])))
        .mount(&server)
        .await;

    let soon = day(2);
    let schedule = format!(
        "<html><body><div><h2>UPCOMING FOOD TRUCKS</h2><p>Thursday, {}/{}: Tisket Tasket</p></div></body></html>",
        soon.month(),
        soon.day()
    );
    Mock::given(method("GET"))
        .and(path("/wheelie-pop"))
        .respond_with(ResponseTemplate::new(200).set_body_string(schedule))
        .mount(&server)
        .await;

    // Status errors are content failures and must not be retried
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let sources = vec![
        Source::new("littlefield", "Littlefield", format!("{}/littlefield", server.uri()))
            .with_parser_type("json_ld"),
        Source::new("wheelie-pop", "Wheelie Pop", format!("{}/wheelie-pop", server.uri()))
            .with_parser_type("text_search"),
        Source::new("gone", "Gone Brewing", format!("{}/gone", server.uri()))
            .with_parser_type("json_ld"),
        Source::new("mystery", "Mystery Venue", format!("{}/mystery", server.uri())),
    ];

    let report = coordinator(test_config()).scrape_all(&sources).await.unwrap();

    let titles: Vec<_> = report.events.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["The Dirty Dozen", "Tisket Tasket", "Sunny Side"]);

    let failures: Vec<_> = report
        .errors()
        .iter()
        .map(|e| (e.source.key.as_str(), e.kind))
        .collect();
    assert_eq!(
        failures,
        vec![("gone", ErrorKind::Parser), ("mystery", ErrorKind::Configuration)]
    );
    assert_eq!(report.outcome(), RunOutcome::Partial);
    assert_eq!(
        report.user_messages(),
        vec![
            "Failed to fetch information for source: Gone Brewing",
            "Failed to fetch information for source: Mystery Venue",
        ]
    );
}

#[tokio::test]
async fn test_connection_refused_is_retried_then_reported() {
    let config = ScraperConfig {
        max_retries: 2,
        ..test_config()
    };
    let source = Source::new("offline", "Offline Taproom", "http://127.0.0.1:9/").with_parser_type("json_ld");

    let report = coordinator(config).scrape_one(&source).await.unwrap();

    assert!(report.events.is_empty());
    let error = &report.errors()[0];
    assert_eq!(error.kind, ErrorKind::Network);
    assert!(error.message.starts_with("Network error: "));
    assert_eq!(error.detail.as_deref(), Some("Failed after 2 attempts"));
    assert_eq!(report.outcome(), RunOutcome::Failure);
}

#[tokio::test]
async fn test_timeout_is_retried_then_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(json_ld_page(&[("Late Show", day(1))]))
                .set_delay(Duration::from_secs(3)),
        )
        .expect(2)
        .mount(&server)
        .await;

    let config = ScraperConfig {
        max_retries: 2,
        timeout_secs: 1,
        ..test_config()
    };
    let source = Source::new("slow", "Slow Venue", server.uri()).with_parser_type("json_ld");
    let report = coordinator(config).scrape_all(&[source]).await.unwrap();

    let error = &report.errors()[0];
    assert_eq!(error.kind, ErrorKind::NetworkTimeout);
    assert_eq!(error.message, "Connection timeout after 1s");
}

#[tokio::test]
async fn test_connection_cap_limits_parallel_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(json_ld_page(&[("Capped", day(1))]))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let sources: Vec<_> = (0..3)
        .map(|i| {
            Source::new(format!("venue-{i}"), format!("Venue {i}"), format!("{}/v{i}", server.uri()))
                .with_parser_type("json_ld")
        })
        .collect();

    let config = ScraperConfig {
        max_concurrent: 1,
        ..test_config()
    };
    let started = Instant::now();
    let report = coordinator(config).scrape_all(&sources).await.unwrap();

    assert_eq!(report.events.len(), 3);
    assert!(started.elapsed() >= Duration::from_millis(600));
}

#[tokio::test]
async fn test_html_selectors_end_to_end() {
    let server = MockServer::start().await;
    let page = format!(
        r#"<html><body>
          <div class="food-truck-entry"><h4>Burger Planet</h4><p class="when">{}</p><span class="hrs">1 - 8pm</span></div>
          <div class="food-truck-entry"><h4>Marination</h4><p class="when">{}</p></div>
        </body></html>"#,
        day(3).format("%B %-d"),
        day(1).format("%B %-d"),
    );
    Mock::given(method("GET"))
        .and(path("/ballard/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .mount(&server)
        .await;

    let sources = vec![
        Source::new("stoup-ballard", "Stoup Brewing - Ballard", format!("{}/ballard/", server.uri()))
            .with_parser_type("html_selectors")
            .with_option("event_selector", ".food-truck-entry")
            .with_option("title_selector", "h4")
            .with_option("date_selector", ".when")
            .with_option("time_selector", ".hrs"),
        Source::new("stoup-capitol-hill", "Stoup Brewing - Capitol Hill", format!("{}/ballard/", server.uri()))
            .with_parser_type("html_selectors"),
    ];

    let report = coordinator(test_config()).scrape_all(&sources).await.unwrap();

    let titles: Vec<_> = report.events.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["Marination", "Burger Planet"]);
    assert_eq!(
        report.events[1].start_time.map(|t| t.format("%H:%M").to_string()),
        Some("13:00".to_string())
    );

    assert_eq!(report.errors().len(), 1);
    assert_eq!(report.errors()[0].source.key, "stoup-capitol-hill");
    assert_eq!(report.errors()[0].kind, ErrorKind::Parser);
}
