//! HTTP host tests, run in-process against the axum Router.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use dispatch_core::config::ServerConfig;
use dispatch_core::http::HttpServer;
use tower::ServiceExt;

mod common;

use common::TestApp;

async fn get(server: &HttpServer, uri: &str) -> (StatusCode, axum::http::HeaderMap, String) {
    let response = server
        .router()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_dispatches_to_controller() {
    let app = TestApp::new();
    let server = HttpServer::new(app.framework.clone(), ServerConfig::default());

    let (status, headers, body) = get(&server, "/users/show/42").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "User 42: Ann");
    assert_eq!(headers["content-type"], "text/html; charset=utf-8");
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_root_path() {
    let app = TestApp::new();
    let server = HttpServer::new(app.framework.clone(), ServerConfig::default());

    let (status, _, body) = get(&server, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "home");
}

#[tokio::test]
async fn test_unknown_path_is_404() {
    let app = TestApp::new();
    let server = HttpServer::new(app.framework.clone(), ServerConfig::default());

    let (status, _, body) = get(&server, "/nowhere/at/all").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Could not find a controller"));
}

#[tokio::test]
async fn test_redirect_response() {
    let app = TestApp::new();
    let server = HttpServer::new(app.framework.clone(), ServerConfig::default());

    let (status, headers, body) = get(&server, "/flow/redirect").await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers["location"], "/target");
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_base_url_is_stripped() {
    let app = TestApp::with_main_config("base_url = \"/shop\"\n");
    let server = HttpServer::new(app.framework.clone(), ServerConfig::default());

    let (status, _, body) = get(&server, "/shop/users/show/9").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "User 9: Ann");

    let (_, _, body) = get(&server, "/shop").await;
    assert_eq!(body, "home");
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let app = TestApp::new();
    let server = HttpServer::new(app.framework.clone(), ServerConfig::default());

    let response = server
        .router()
        .oneshot(
            Request::builder()
                .uri("/users")
                .header("x-request-id", "abc-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()["x-request-id"], "abc-123");
}
