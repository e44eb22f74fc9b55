/// End-to-end tests for GET /badge
/// Drives the full router against mocked profile and badge upstreams
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use lapras_badge::{api, config::Config, handlers::AppState};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="28"></svg>"#;

fn app_for(profile_base_url: String, badge_base_url: String) -> Router {
    let config = Config {
        port: 8080,
        profile_base_url,
        badge_base_url,
        http_timeout_secs: 5,
    };
    api::router(Arc::new(AppState::new(&config).unwrap()))
}

async fn get(app: Router, uri: &str) -> (StatusCode, header::HeaderMap, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body.to_vec())
}

fn json_message(body: &[u8]) -> String {
    let value: serde_json::Value = serde_json::from_slice(body).unwrap();
    value["message"].as_str().unwrap().to_string()
}

async fn mount_profile(server: &MockServer, user_id: &str, profile: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/public/{}.json", user_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile))
        .mount(server)
        .await;
}

async fn mount_badge(server: &MockServer, badge_path: &str) {
    Mock::given(method("GET"))
        .and(path(badge_path))
        .and(query_param("style", "for-the-badge"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(SVG, "image/svg+xml"))
        .expect(1..)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_e_score_badge_success() {
    let server = MockServer::start().await;
    mount_profile(
        &server,
        "abc123",
        serde_json::json!({"e_score": 4.2, "b_score": 1.0, "i_score": 2.0}),
    )
    .await;
    mount_badge(&server, "/badge/LAPRAS_E--SCORE-4.20-d50b0b").await;

    let app = app_for(
        format!("{}/public", server.uri()),
        format!("{}/badge", server.uri()),
    );
    let (status, headers, body) = get(app, "/badge?userId=abc123&scoreType=e").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "image/svg+xml");
    assert_eq!(headers[header::CACHE_CONTROL], "max-age=604800");
    assert_eq!(body, SVG.as_bytes());
}

#[tokio::test]
async fn test_each_score_type_selects_its_field() {
    let server = MockServer::start().await;
    mount_profile(
        &server,
        "abc123",
        serde_json::json!({"e_score": 4.2, "b_score": 1.0, "i_score": 3.5}),
    )
    .await;
    mount_badge(&server, "/badge/LAPRAS_B--SCORE-1.00-003089").await;
    mount_badge(&server, "/badge/LAPRAS_I--SCORE-3.50-d50b0b").await;

    let app = app_for(
        format!("{}/public", server.uri()),
        format!("{}/badge", server.uri()),
    );

    let (status, _, _) = get(app.clone(), "/badge?userId=abc123&scoreType=b").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = get(app, "/badge?userId=abc123&scoreType=i").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_absent_score_is_rejected_without_rendering() {
    let profiles = [
        ("sparse", serde_json::json!({"e_score": 4.2})),
        ("stringly", serde_json::json!({"i_score": "4.2"})),
        ("empty", serde_json::Value::Null),
    ];

    for (user_id, profile) in profiles {
        let server = MockServer::start().await;
        mount_profile(&server, user_id, profile).await;
        Mock::given(method("GET"))
            .and(path("/badge/LAPRAS_I--SCORE-NaN-003089"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(SVG, "image/svg+xml"))
            .expect(0)
            .mount(&server)
            .await;

        let app = app_for(
            format!("{}/public", server.uri()),
            format!("{}/badge", server.uri()),
        );
        let (status, headers, body) =
            get(app, &format!("/badge?userId={}&scoreType=i", user_id)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(headers.get(header::CACHE_CONTROL).is_none());
        assert_eq!(
            json_message(&body),
            "Profile field i_score is missing or not a number"
        );

        let requests = server.received_requests().await.unwrap();
        assert!(requests.iter().all(|r| !r.url.path().starts_with("/badge")));
    }
}

#[tokio::test]
async fn test_missing_user_id_is_rejected() {
    let server = MockServer::start().await;
    let app = app_for(server.uri(), server.uri());

    let (status, headers, body) = get(app, "/badge?scoreType=e").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(headers[header::CONTENT_TYPE], "application/json");
    assert_eq!(json_message(&body), "userId is a required field");
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_score_type_is_rejected() {
    let server = MockServer::start().await;
    let app = app_for(server.uri(), server.uri());

    let (status, _, body) = get(app, "/badge?userId=abc123").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json_message(&body), "scoreType is a required field");
}

#[tokio::test]
async fn test_invalid_score_type_is_rejected() {
    let server = MockServer::start().await;
    let app = app_for(server.uri(), server.uri());

    let (status, _, body) = get(app, "/badge?userId=abc123&scoreType=x").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json_message(&body),
        "scoreType must be one of the following values: e, b, i"
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_profile_network_error_is_bad_request() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let dead = format!("http://127.0.0.1:{}", listener.local_addr().unwrap().port());
    drop(listener);

    let app = app_for(dead.clone(), dead);
    let (status, _, body) = get(app, "/badge?userId=abc123&scoreType=e").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json_message(&body).starts_with("Profile request failed"));
}

#[tokio::test]
async fn test_profile_non_json_is_bad_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/abc123.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let app = app_for(server.uri(), server.uri());
    let (status, _, body) = get(app, "/badge?userId=abc123&scoreType=b").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json_message(&body).starts_with("Failed to parse profile response"));
}

#[tokio::test]
async fn test_badge_network_error_is_bad_request() {
    let server = MockServer::start().await;
    mount_profile(&server, "abc123", serde_json::json!({"e_score": 1.0})).await;

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let dead = format!("http://127.0.0.1:{}", listener.local_addr().unwrap().port());
    drop(listener);

    let app = app_for(format!("{}/public", server.uri()), dead);
    let (status, _, body) = get(app, "/badge?userId=abc123&scoreType=e").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json_message(&body).starts_with("Badge request failed"));
}

#[tokio::test]
async fn test_repeated_requests_are_byte_identical() {
    let server = MockServer::start().await;
    mount_profile(&server, "abc123", serde_json::json!({"b_score": 3.456})).await;
    mount_badge(&server, "/badge/LAPRAS_B--SCORE-3.46-003089").await;

    let app = app_for(
        format!("{}/public", server.uri()),
        format!("{}/badge", server.uri()),
    );

    let (_, first_headers, first) = get(app.clone(), "/badge?userId=abc123&scoreType=b").await;
    let (_, second_headers, second) = get(app, "/badge?userId=abc123&scoreType=b").await;

    assert_eq!(first, second);
    assert_eq!(first_headers[header::CACHE_CONTROL], second_headers[header::CACHE_CONTROL]);
}

#[tokio::test]
async fn test_health() {
    let server = MockServer::start().await;
    let app = app_for(server.uri(), server.uri());

    let (status, _, body) = get(app, "/health").await;
    let value: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["status"], "healthy");
    assert_eq!(value["service"], "lapras-badge");
}
