//! Integration tests for the prefetch engine.
//!
//! These tests drive the full hover-to-cache flow against a mock HTTP
//! server, with short timing windows so real sleeps stay cheap.

mod support;
use support::socket_guard::{socket_skip_return, start_mock_server_or_skip};

use std::sync::Arc;
use std::time::Duration;

use nav_prefetch::{
    ConnectionInfo, EffectiveType, FixedConnection, PageClient, PrefetchConfig, PrefetchEngine,
};
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

const ROUTES: [&str; 5] = ["/", "/leads", "/clients", "/tasks", "/notes"];

/// Config with explicit timing windows against the given origin.
fn engine_config(origin: &str, debounce: Duration, ttl: Duration, idle: Duration) -> PrefetchConfig {
    let mut config = PrefetchConfig::new(origin, ROUTES);
    config.debounce = debounce;
    config.cache_ttl = ttl;
    config.idle_window = idle;
    config
}

/// Config with a short debounce and generous cache and idle windows.
fn quick_config(origin: &str) -> PrefetchConfig {
    engine_config(
        origin,
        Duration::from_millis(50),
        Duration::from_secs(60),
        Duration::from_secs(5),
    )
}

async fn settle(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[tokio::test]
async fn test_sustained_hover_populates_cache() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return socket_skip_return();
    };

    // Only the XHR-marked request matches; a bare navigation GET would 404.
    Mock::given(method("GET"))
        .and(path("/leads"))
        .and(header("X-Requested-With", "XMLHttpRequest"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>leads page</html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let engine = PrefetchEngine::with_defaults(&quick_config(&mock_server.uri())).unwrap();

    engine.hover_enter("/leads");
    settle(400).await;

    assert_eq!(engine.cache_size(), 1);
}

#[tokio::test]
async fn test_hover_with_query_prefetches_bare_route() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return socket_skip_return();
    };

    Mock::given(method("GET"))
        .and(path("/leads"))
        .respond_with(ResponseTemplate::new(200).set_body_string("leads"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let engine = PrefetchEngine::with_defaults(&quick_config(&mock_server.uri())).unwrap();

    engine.hover_enter("/leads?page=2#row-14");
    settle(400).await;

    assert_eq!(engine.cache_size(), 1);
}

#[tokio::test]
async fn test_hover_leave_before_debounce_cancels() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return socket_skip_return();
    };

    Mock::given(method("GET"))
        .and(path("/leads"))
        .respond_with(ResponseTemplate::new(200).set_body_string("leads"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = engine_config(
        &mock_server.uri(),
        Duration::from_millis(400),
        Duration::from_secs(60),
        Duration::from_secs(5),
    );
    let engine = PrefetchEngine::with_defaults(&config).unwrap();

    engine.hover_enter("/leads");
    settle(50).await;
    engine.hover_leave();
    settle(700).await;

    assert_eq!(engine.cache_size(), 0);
}

#[tokio::test]
async fn test_repeat_hover_is_single_flight() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return socket_skip_return();
    };

    Mock::given(method("GET"))
        .and(path("/leads"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("leads")
                .set_delay(Duration::from_millis(400)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let engine = PrefetchEngine::with_defaults(&quick_config(&mock_server.uri())).unwrap();

    engine.hover_enter("/leads");
    settle(200).await;
    // First fetch is still waiting on the delayed response.
    engine.hover_enter("/leads");
    settle(600).await;

    assert_eq!(engine.cache_size(), 1);
}

#[tokio::test]
async fn test_new_hover_supersedes_previous_fetch() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return socket_skip_return();
    };

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("tasks")
                .set_delay(Duration::from_millis(600)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/clients"))
        .respond_with(ResponseTemplate::new(200).set_body_string("clients"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let engine = PrefetchEngine::with_defaults(&quick_config(&mock_server.uri())).unwrap();

    engine.hover_enter("/tasks");
    settle(200).await;
    // The slow /tasks fetch is in flight; this aborts it.
    engine.hover_enter("/clients");
    settle(800).await;

    // Had /tasks survived, its delayed response would have landed by now.
    assert_eq!(engine.cache_size(), 1);
}

#[tokio::test]
async fn test_server_error_is_silent() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return socket_skip_return();
    };

    Mock::given(method("GET"))
        .and(path("/leads"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/clients"))
        .respond_with(ResponseTemplate::new(200).set_body_string("clients"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let engine = PrefetchEngine::with_defaults(&quick_config(&mock_server.uri())).unwrap();

    engine.hover_enter("/leads");
    settle(300).await;
    assert_eq!(engine.cache_size(), 0, "Failed fetch must not be cached");

    // The engine keeps working after a failure.
    engine.hover_enter("/clients");
    settle(300).await;
    assert_eq!(engine.cache_size(), 1);
}

#[tokio::test]
async fn test_save_data_preference_blocks_fetch() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return socket_skip_return();
    };

    Mock::given(method("GET"))
        .and(path("/leads"))
        .respond_with(ResponseTemplate::new(200).set_body_string("leads"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = quick_config(&mock_server.uri());
    let origin = Url::parse(&mock_server.uri()).unwrap();
    let engine = PrefetchEngine::new(
        &config,
        Arc::new(PageClient::new(origin)),
        Arc::new(FixedConnection(Some(ConnectionInfo {
            save_data: true,
            effective_type: EffectiveType::FourG,
        }))),
    )
    .unwrap();

    engine.hover_enter("/leads");
    settle(300).await;

    assert_eq!(engine.cache_size(), 0);
}

#[tokio::test]
async fn test_slow_connection_blocks_fetch() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return socket_skip_return();
    };

    Mock::given(method("GET"))
        .and(path("/leads"))
        .respond_with(ResponseTemplate::new(200).set_body_string("leads"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = quick_config(&mock_server.uri());
    let origin = Url::parse(&mock_server.uri()).unwrap();
    let engine = PrefetchEngine::new(
        &config,
        Arc::new(PageClient::new(origin)),
        Arc::new(FixedConnection(Some(ConnectionInfo {
            save_data: false,
            effective_type: EffectiveType::Slow2g,
        }))),
    )
    .unwrap();

    engine.hover_enter("/leads");
    settle(300).await;

    assert_eq!(engine.cache_size(), 0);
}

#[tokio::test]
async fn test_idle_user_requires_interaction() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return socket_skip_return();
    };

    Mock::given(method("GET"))
        .and(path("/leads"))
        .respond_with(ResponseTemplate::new(200).set_body_string("leads"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = engine_config(
        &mock_server.uri(),
        Duration::from_millis(50),
        Duration::from_secs(60),
        Duration::from_millis(300),
    );
    let engine = PrefetchEngine::with_defaults(&config).unwrap();

    // Let the idle window lapse with no interaction.
    settle(500).await;
    engine.hover_enter("/leads");
    settle(300).await;
    assert_eq!(engine.cache_size(), 0, "Idle user must not trigger prefetch");

    engine.record_interaction();
    engine.hover_enter("/leads");
    settle(400).await;
    assert_eq!(engine.cache_size(), 1);
}

#[tokio::test]
async fn test_clear_cache_allows_refetch() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return socket_skip_return();
    };

    Mock::given(method("GET"))
        .and(path("/leads"))
        .respond_with(ResponseTemplate::new(200).set_body_string("leads"))
        .expect(2)
        .mount(&mock_server)
        .await;

    let engine = PrefetchEngine::with_defaults(&quick_config(&mock_server.uri())).unwrap();

    engine.hover_enter("/leads");
    settle(300).await;
    assert_eq!(engine.cache_size(), 1);

    engine.clear_cache();
    assert_eq!(engine.cache_size(), 0);

    // A fresh entry would have made this hover a no-op.
    engine.hover_enter("/leads");
    settle(300).await;
    assert_eq!(engine.cache_size(), 1);
}

#[tokio::test]
async fn test_cookie_jar_is_attached_to_fetches() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return socket_skip_return();
    };

    Mock::given(method("GET"))
        .and(path("/leads"))
        .and(header("cookie", "session=abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_string("leads"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let origin = Url::parse(&mock_server.uri()).unwrap();
    let cookie_jar = Arc::new(reqwest::cookie::Jar::default());
    cookie_jar.add_cookie_str("session=abc123", &origin);

    let config = quick_config(&mock_server.uri());
    let engine = PrefetchEngine::with_cookie_jar(&config, cookie_jar).unwrap();

    engine.hover_enter("/leads");
    settle(400).await;

    assert_eq!(engine.cache_size(), 1);
}

#[tokio::test]
async fn test_shutdown_stops_prefetching() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return socket_skip_return();
    };

    Mock::given(method("GET"))
        .and(path("/leads"))
        .respond_with(ResponseTemplate::new(200).set_body_string("leads"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/clients"))
        .respond_with(ResponseTemplate::new(200).set_body_string("clients"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let engine = PrefetchEngine::with_defaults(&quick_config(&mock_server.uri())).unwrap();

    engine.hover_enter("/leads");
    settle(300).await;
    assert_eq!(engine.cache_size(), 1);

    engine.shutdown();
    assert!(!engine.is_active());

    engine.hover_enter("/clients");
    settle(300).await;
    assert_eq!(engine.cache_size(), 1, "Shutdown engine must not fetch");

    // Second shutdown is a no-op.
    engine.shutdown();
}

#[tokio::test]
async fn test_foreign_links_never_fetched() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return socket_skip_return();
    };

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("anything"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let engine = PrefetchEngine::with_defaults(&quick_config(&mock_server.uri())).unwrap();

    engine.hover_enter("/settings");
    engine.hover_enter("https://other.example.com/leads");
    engine.hover_enter("mailto:team@example.com");
    settle(300).await;

    assert_eq!(engine.cache_size(), 0);
}
