//! Session gate, site content and response headers.

mod common;

use axum::http::{StatusCode, header};
use chrono::{Duration, Utc};
use tower::ServiceExt;

use common::*;

fn cookie_for(app: &TestApp, email: &str) -> String {
    format!("auth_token={}", app.codec.issue(email).unwrap())
}

#[tokio::test]
async fn test_protected_routes_redirect_without_session() {
    let app = test_app(Outcome::Accept("alice@example.com"), false);

    for uri in ["/dashboard", "/api/dashboard_data", "/api/user"] {
        let response = app.router.clone().oneshot(get(uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&response), "/", "{uri}");
    }
}

#[tokio::test]
async fn test_tampered_session_redirects() {
    let app = test_app(Outcome::Accept("alice@example.com"), false);
    let token = app.codec.issue("alice@example.com").unwrap();
    let mut bytes = token.into_bytes();
    let last = bytes.len() - 1;
    bytes[last] = if bytes[last] == b'A' { b'B' } else { b'A' };
    let tampered = String::from_utf8(bytes).unwrap();

    let response = app
        .router
        .oneshot(get("/api/user", Some(&format!("auth_token={tampered}"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_expired_session_redirects() {
    let app = test_app(Outcome::Accept("alice@example.com"), false);
    let token = app
        .codec
        .issue_at("alice@example.com", Utc::now() - Duration::hours(24) - Duration::seconds(1))
        .unwrap();

    let response = app
        .router
        .oneshot(get("/dashboard", Some(&format!("auth_token={token}"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_dashboard_with_session() {
    let app = test_app(Outcome::Accept("alice@example.com"), false);
    let cookie = cookie_for(&app, "alice@example.com");

    let response = app
        .router
        .clone()
        .oneshot(get("/dashboard", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );
    assert_eq!(body_text(response).await, DASHBOARD_HTML);

    let response = app
        .router
        .oneshot(get("/api/dashboard_data", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    assert_eq!(body_text(response).await, r#"{"items":[1,2,3]}"#);
}

#[tokio::test]
async fn test_missing_dashboard_data_is_server_error() {
    let app = test_app(Outcome::Accept("alice@example.com"), false);
    std::fs::remove_file(app.dir.path().join("item_data.json")).unwrap();
    let cookie = cookie_for(&app, "alice@example.com");

    let response = app
        .router
        .oneshot(get("/api/dashboard_data", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_monitor_is_public_plain_text() {
    let app = test_app(Outcome::Accept("alice@example.com"), false);

    let response = app.router.oneshot(get("/monitor", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
    assert_eq!(body_text(response).await, "all systems nominal");
}

#[tokio::test]
async fn test_missing_monitor_file() {
    let app = test_app(Outcome::Accept("alice@example.com"), false);
    std::fs::remove_file(app.dir.path().join("monitor.txt")).unwrap();

    let response = app.router.oneshot(get("/monitor", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(response).await, "Error reading monitor file");
}

#[tokio::test]
async fn test_client_config() {
    let app = test_app(Outcome::Accept("alice@example.com"), false);

    let response = app.router.oneshot(get("/api/config", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["client_id"], CLIENT_ID);
    assert_eq!(json["login_uri"], "http://localhost:8080/api/login");
}

#[tokio::test]
async fn test_dynamic_responses_are_not_cached() {
    let app = test_app(Outcome::Accept("alice@example.com"), false);

    // Redirects from the gate carry the headers too
    let response = app.router.oneshot(get("/api/user", None)).await.unwrap();
    let headers = response.headers();
    assert_eq!(
        headers[header::CACHE_CONTROL],
        "no-store, no-cache, must-revalidate, max-age=0"
    );
    assert_eq!(headers[header::PRAGMA], "no-cache");
    assert_eq!(headers[header::X_FRAME_OPTIONS], "DENY");
    assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    assert!(!headers.contains_key(header::STRICT_TRANSPORT_SECURITY));
}

#[tokio::test]
async fn test_static_files_are_cacheable() {
    let app = test_app(Outcome::Accept("alice@example.com"), false);

    let response = app.router.clone().oneshot(get("/style.css", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CACHE_CONTROL],
        "public, max-age=14400, must-revalidate"
    );
    assert_eq!(response.headers()[header::X_FRAME_OPTIONS], "DENY");
    assert_eq!(body_text(response).await, "body {}");

    let response = app.router.oneshot(get("/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "<html>login</html>");
}
