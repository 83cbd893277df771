mod common;

use axum::http::{HeaderValue, StatusCode, header};
use serde_json::{Value, json};

#[tokio::test]
async fn test_redirect_success() {
    let (server, _state) = common::create_test_server().await;
    common::create_custom_link(&server, "test123", "https://example.com/landing").await;

    let response = server.get("/test123").await;

    response.assert_status(StatusCode::FOUND);
    assert_eq!(response.header("location"), "https://example.com/landing");
}

#[tokio::test]
async fn test_redirect_counts_clicks() {
    let (server, _state) = common::create_test_server().await;
    common::create_custom_link(&server, "counted", "https://example.com").await;

    for _ in 0..3 {
        server.get("/counted").await.assert_status(StatusCode::FOUND);
    }

    let json = server.get("/api/links").await.json::<Value>();
    assert_eq!(json["items"][0]["code"], "counted");
    assert_eq!(json["items"][0]["clicks"], 3);
}

#[tokio::test]
async fn test_redirect_not_found() {
    let (server, _state) = common::create_test_server().await;

    let response = server.get("/nonexistent").await;

    response.assert_status_not_found();
    let json = response.json::<Value>();
    assert_eq!(json["error"]["code"], "not_found");
    assert_eq!(json["error"]["message"], "Link not found or expired");
}

#[tokio::test]
async fn test_redirect_is_case_sensitive() {
    let (server, _state) = common::create_test_server().await;
    common::create_custom_link(&server, "Promo", "https://example.com").await;

    server.get("/Promo").await.assert_status(StatusCode::FOUND);
    server.get("/promo").await.assert_status_not_found();
}

#[tokio::test]
async fn test_redirect_expired_link_is_indistinguishable_from_unknown() {
    let (server, _state) = common::create_test_server().await;
    common::create_link(
        &server,
        json!({ "url": "https://example.com", "custom_code": "expired", "expiration_days": 0 }),
    )
    .await;

    let expired = server.get("/expired").await;
    let unknown = server.get("/never-existed").await;

    expired.assert_status_not_found();
    assert_eq!(
        expired.json::<Value>()["error"]["message"],
        unknown.json::<Value>()["error"]["message"]
    );

    let json = server.get("/api/links").await.json::<Value>();
    assert_eq!(json["items"][0]["is_active"], false);
    assert_eq!(json["items"][0]["status"], "expired");
    assert_eq!(json["items"][0]["clicks"], 0);
}

#[tokio::test]
async fn test_redirect_deleted_link() {
    let (server, _state) = common::create_test_server().await;
    let link = common::create_custom_link(&server, "deleted", "https://example.com").await;
    let id = link["id"].as_i64().unwrap();

    server
        .delete(&format!("/api/links/{id}"))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    server.get("/deleted").await.assert_status_not_found();
}

#[tokio::test]
async fn test_redirect_captures_click_context() {
    let (server, _state) = common::create_test_server().await;
    common::create_custom_link(&server, "ctx", "https://example.com").await;

    server
        .get("/ctx")
        .add_header(
            header::REFERER,
            HeaderValue::from_static("https://www.google.com/search?q=rust"),
        )
        .add_header(
            header::USER_AGENT,
            HeaderValue::from_static("Mozilla/5.0 (iPhone; CPU iPhone OS 17_0) Mobile"),
        )
        .add_header(
            header::HeaderName::from_static("cf-ipcountry"),
            HeaderValue::from_static("DE"),
        )
        .await
        .assert_status(StatusCode::FOUND);
    server.get("/ctx").await.assert_status(StatusCode::FOUND);

    let sources = server
        .get("/api/analytics/breakdown/source")
        .await
        .json::<Value>();
    assert_eq!(sources, json!({ "direct": 1, "www.google.com": 1 }));

    let countries = server
        .get("/api/analytics/breakdown/country")
        .await
        .json::<Value>();
    assert_eq!(countries, json!({ "DE": 1, "Unknown": 1 }));

    let devices = server
        .get("/api/analytics/breakdown/device")
        .await
        .json::<Value>();
    assert_eq!(devices, json!({ "Mobile": 1, "Unknown": 1 }));
}
