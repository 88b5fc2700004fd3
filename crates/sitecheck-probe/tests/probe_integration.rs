//! Integration tests for link probing against a local HTTP server.

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::Redirect,
    routing::get,
    Router,
};
use sitecheck_core::ProbeConfig;
use sitecheck_probe::{broken_link_result, response_time_result, LinkProber, ProbeOutcome};
use std::net::SocketAddr;
use std::time::Duration;

async fn require_chrome_agent(headers: HeaderMap) -> StatusCode {
    let agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if agent.contains("Chrome/115") {
        StatusCode::OK
    } else {
        StatusCode::FORBIDDEN
    }
}

async fn spawn_server() -> SocketAddr {
    let app = Router::new()
        .route("/ok", get(|| async { "ok" }))
        .route("/missing", get(|| async { (StatusCode::NOT_FOUND, "missing") }))
        .route("/error", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .route("/moved", get(|| async { Redirect::permanent("/ok") }))
        .route("/agent", get(require_chrome_agent))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(300)).await;
                "slow"
            }),
        )
        .route(
            "/hang",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn url(addr: SocketAddr, path: &str) -> String {
    format!("http://{}{}", addr, path)
}

#[tokio::test]
async fn test_status_codes_classified() {
    let addr = spawn_server().await;
    let prober = LinkProber::new(ProbeConfig::default()).unwrap();

    let ok = prober.probe(&url(addr, "/ok")).await;
    assert_eq!(ok.status(), Some(200));
    assert!(broken_link_result(&ok).passed);

    let missing = prober.probe(&url(addr, "/missing")).await;
    assert_eq!(missing.status(), Some(404));
    let result = broken_link_result(&missing);
    assert!(!result.passed);
    assert!(result.message.contains("Status: 404"));

    let error = prober.probe(&url(addr, "/error")).await;
    assert!(!broken_link_result(&error).passed);
}

#[tokio::test]
async fn test_redirects_are_followed() {
    let addr = spawn_server().await;
    let prober = LinkProber::new(ProbeConfig::default()).unwrap();

    let moved = prober.probe(&url(addr, "/moved")).await;
    assert_eq!(moved.status(), Some(200));
}

#[tokio::test]
async fn test_configured_user_agent_is_sent() {
    let addr = spawn_server().await;

    let prober = LinkProber::new(ProbeConfig::default()).unwrap();
    assert_eq!(prober.probe(&url(addr, "/agent")).await.status(), Some(200));

    let bot = LinkProber::new(ProbeConfig {
        user_agent: "sitecheck-bot/0.1".to_string(),
        ..ProbeConfig::default()
    })
    .unwrap();
    assert_eq!(bot.probe(&url(addr, "/agent")).await.status(), Some(403));
}

#[tokio::test]
async fn test_slow_response_exceeds_threshold() {
    let addr = spawn_server().await;
    let prober = LinkProber::new(ProbeConfig::default()).unwrap();

    let slow = prober.probe(&url(addr, "/slow")).await;
    assert!(slow.elapsed().unwrap() >= Duration::from_millis(300));
    assert!(!response_time_result(&slow, Duration::from_millis(100)).passed);
    assert!(response_time_result(&slow, Duration::from_secs(5)).passed);
}

#[tokio::test]
async fn test_request_timeout_is_a_failure() {
    let addr = spawn_server().await;
    let prober = LinkProber::new(ProbeConfig {
        request_timeout_secs: 1,
        ..ProbeConfig::default()
    })
    .unwrap();

    let hung = prober.probe(&url(addr, "/hang")).await;
    assert!(matches!(hung.outcome, ProbeOutcome::Failed { .. }));
    assert!(!broken_link_result(&hung).passed);
}

#[tokio::test]
async fn test_connection_refused_is_a_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let prober = LinkProber::new(ProbeConfig::default()).unwrap();
    let refused = prober.probe(&url(addr, "/")).await;

    let result = broken_link_result(&refused);
    assert!(!result.passed);
    assert!(result.message.starts_with(&format!("Request: {}", url(addr, "/"))));
}

#[tokio::test]
async fn test_probe_all_keeps_input_order() {
    let addr = spawn_server().await;
    let prober = LinkProber::new(ProbeConfig::default()).unwrap();

    let urls = vec![
        url(addr, "/slow"),
        url(addr, "/ok"),
        url(addr, "/missing"),
        url(addr, "/ok"),
    ];
    let probes = prober.probe_all(&urls, 4).await;

    let probed: Vec<_> = probes.iter().map(|p| p.url.clone()).collect();
    assert_eq!(probed, urls);
    let statuses: Vec<_> = probes.iter().map(|p| p.status()).collect();
    assert_eq!(statuses, vec![Some(200), Some(200), Some(404), Some(200)]);
}
