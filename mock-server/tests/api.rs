use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, BINARY_BODY, TEXT_BODY};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

// --- echo ---

#[tokio::test]
async fn echo_reflects_method_headers_and_body() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri("/echo")
                .header("x-tag", "a")
                .header("x-tag", "b")
                .body(r#"{"k":"v"}"#.to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["method"], "PATCH");
    assert_eq!(json["body"]["k"], "v");
    let tags: Vec<&str> = json["headers"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|pair| pair[0] == "x-tag")
        .map(|pair| pair[1].as_str().unwrap())
        .collect();
    assert_eq!(tags, vec!["a", "b"]);
}

#[tokio::test]
async fn echo_without_body_reports_null() {
    let resp = app().oneshot(request("GET", "/echo", "")).await.unwrap();
    let json = body_json(resp).await;
    assert_eq!(json["method"], "GET");
    assert!(json["body"].is_null());
}

// --- status ---

#[tokio::test]
async fn status_route_returns_requested_code_with_message() {
    let resp = app().oneshot(request("DELETE", "/status/404", "")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let json = body_json(resp).await;
    assert_eq!(json["message"], "Not Found");
    assert_eq!(json["code"], 404);
}

#[tokio::test]
async fn status_empty_route_has_no_body() {
    let resp = app()
        .oneshot(request("GET", "/status/503/empty", ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn status_route_rejects_invalid_code() {
    let resp = app().oneshot(request("GET", "/status/42", "")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- raw bodies ---

#[tokio::test]
async fn text_route_returns_plain_text() {
    let resp = app().oneshot(request("GET", "/text", "")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_bytes(resp).await, TEXT_BODY.as_bytes());
}

#[tokio::test]
async fn binary_route_returns_non_utf8_bytes() {
    let resp = app().oneshot(request("GET", "/binary", "")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_bytes(resp).await, BINARY_BODY);
}

#[tokio::test]
async fn empty_route_returns_ok_without_body() {
    let resp = app().oneshot(request("POST", "/empty", "{}")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn slow_route_replies_after_delay() {
    let started = std::time::Instant::now();
    let resp = app().oneshot(request("GET", "/slow/50", "")).await.unwrap();
    assert!(started.elapsed() >= std::time::Duration::from_millis(50));
    assert_eq!(body_json(resp).await["slept"], 50);
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let resp = app().oneshot(request("GET", "/nope", "")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
