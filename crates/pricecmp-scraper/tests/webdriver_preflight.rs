//! Integration tests for the WebDriver readiness check and session setup.
//!
//! A `wiremock` server stands in for chromedriver, so no browser is needed.
//! Session setup and teardown are faked at the protocol level; page
//! interaction needs a real browser.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::FutureExt;

use pricecmp_core::WindowSize;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pricecmp_scraper::{check_webdriver_ready, with_session, BrowserSession, ScraperError, SessionOptions};

const TIMEOUT: Duration = Duration::from_secs(5);

fn options_for(server: &MockServer) -> SessionOptions {
    SessionOptions {
        webdriver_url: server.uri(),
        headless: true,
        window_size: WindowSize {
            width: 1280,
            height: 800,
        },
        user_agent: "pricecmp-test/0.1".to_string(),
        status_timeout: TIMEOUT,
        poll_interval: Duration::from_millis(50),
    }
}

async fn mount_status(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(server)
        .await;
}

/// Fakes a chromedriver that grants session `abc` and accepts its close.
async fn mount_session(server: &MockServer) {
    mount_status(server, json!({"value": {"ready": true}})).await;
    Mock::given(method("POST"))
        .and(path("/session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "value": {"sessionId": "abc", "capabilities": {}}
        })))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/session/abc/timeouts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({"value": null})))
        .mount(server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/session/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({"value": null})))
        .mount(server)
        .await;
}

async fn session_deletes(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .expect("request recording is on by default")
        .iter()
        .filter(|r| r.method.as_str() == "DELETE" && r.url.path() == "/session/abc")
        .count()
}

#[tokio::test]
async fn ready_server_passes_preflight() {
    let server = MockServer::start().await;
    mount_status(
        &server,
        json!({"value": {"ready": true, "message": "ChromeDriver ready for new sessions."}}),
    )
    .await;

    check_webdriver_ready(&server.uri(), TIMEOUT)
        .await
        .expect("ready server should pass");
}

#[tokio::test]
async fn trailing_slash_in_url_is_tolerated() {
    let server = MockServer::start().await;
    mount_status(&server, json!({"value": {"ready": true}})).await;

    let url = format!("{}/", server.uri());
    assert!(check_webdriver_ready(&url, TIMEOUT).await.is_ok());
}

#[tokio::test]
async fn busy_server_is_a_setup_error() {
    let server = MockServer::start().await;
    mount_status(
        &server,
        json!({"value": {"ready": false, "message": "session already exists"}}),
    )
    .await;

    let err = check_webdriver_ready(&server.uri(), TIMEOUT)
        .await
        .unwrap_err();
    match err {
        ScraperError::Setup { reason, .. } => {
            assert!(reason.contains("session already exists"), "reason: {reason}");
        }
        other => panic!("expected Setup, got {other:?}"),
    }
}

#[tokio::test]
async fn server_error_is_a_setup_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = check_webdriver_ready(&server.uri(), TIMEOUT)
        .await
        .unwrap_err();
    assert!(matches!(err, ScraperError::Setup { .. }), "got {err:?}");
}

#[tokio::test]
async fn non_webdriver_body_is_a_setup_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>nginx</html>"))
        .mount(&server)
        .await;

    let err = check_webdriver_ready(&server.uri(), TIMEOUT)
        .await
        .unwrap_err();
    assert!(matches!(err, ScraperError::Setup { .. }), "got {err:?}");
}

#[tokio::test]
async fn unreachable_server_is_a_setup_error() {
    // Bind then drop a server so the port is known to be closed.
    let uri = {
        let server = MockServer::start().await;
        server.uri()
    };

    let err = check_webdriver_ready(&uri, Duration::from_secs(2))
        .await
        .unwrap_err();
    match err {
        ScraperError::Setup { webdriver_url, .. } => assert_eq!(webdriver_url, uri),
        other => panic!("expected Setup, got {other:?}"),
    }
}

#[tokio::test]
async fn connect_fails_when_status_endpoint_missing() {
    let server = MockServer::start().await;

    let result = BrowserSession::connect(&options_for(&server)).await;
    assert!(matches!(result, Err(ScraperError::Setup { .. })));
}

#[tokio::test]
async fn with_session_skips_body_when_session_is_refused() {
    let server = MockServer::start().await;
    mount_status(&server, json!({"value": {"ready": true}})).await;
    Mock::given(method("POST"))
        .and(path("/session"))
        .respond_with(ResponseTemplate::new(500).set_body_json(&json!({
            "value": {
                "error": "session not created",
                "message": "Chrome failed to start",
                "stacktrace": ""
            }
        })))
        .mount(&server)
        .await;

    let ran = AtomicBool::new(false);
    let result = with_session(&options_for(&server), |_session| async {
        ran.store(true, Ordering::SeqCst);
    })
    .await;

    assert!(matches!(result, Err(ScraperError::Setup { .. })), "got {result:?}");
    assert!(!ran.load(Ordering::SeqCst));
}

#[tokio::test(flavor = "multi_thread")]
async fn with_session_closes_session_after_body_returns() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    let result = with_session(&options_for(&server), |_session| async { 7 }).await;

    assert_eq!(result.unwrap(), 7);
    assert_eq!(session_deletes(&server).await, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn with_session_closes_session_when_body_panics() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    let outcome = AssertUnwindSafe(with_session::<(), _, _>(
        &options_for(&server),
        |_session| async { panic!("extraction blew up") },
    ))
    .catch_unwind()
    .await;

    let panic = outcome.expect_err("the body's panic should propagate");
    assert_eq!(panic.downcast_ref::<&str>(), Some(&"extraction blew up"));
    assert_eq!(session_deletes(&server).await, 1);
}
