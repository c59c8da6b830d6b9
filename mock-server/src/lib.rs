//! Scripted HTTP server for exercising the REST client end to end.
//!
//! Each route produces one kind of response the client has to normalize:
//! JSON echoes, arbitrary statuses with and without bodies, plain text,
//! bytes that are not UTF-8, an empty 200 and a delayed reply.

use std::time::Duration;

use axum::{
    body::Bytes,
    extract::Path,
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub const TEXT_BODY: &str = "plain text body";
pub const BINARY_BODY: &[u8] = &[0xff, 0xfe, 0xfd];

/// What `/echo` saw.
#[derive(Debug, Serialize)]
pub struct Echo {
    pub method: String,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

pub fn app() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/status/{code}", any(status_with_body))
        .route("/status/{code}/empty", any(status_only))
        .route("/text", get(text))
        .route("/binary", get(binary))
        .route("/empty", any(empty))
        .route("/slow/{millis}", get(slow))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(method: Method, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    tracing::debug!("echo {method}");
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    Json(Echo {
        method: method.to_string(),
        headers,
        body,
    })
}

fn parse_status(code: u16) -> Result<StatusCode, StatusCode> {
    StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)
}

async fn status_with_body(Path(code): Path<u16>) -> Result<Response, StatusCode> {
    let status = parse_status(code)?;
    let message = status.canonical_reason().unwrap_or("custom status");
    Ok((status, Json(json!({ "message": message, "code": code }))).into_response())
}

async fn status_only(Path(code): Path<u16>) -> Result<StatusCode, StatusCode> {
    parse_status(code)
}

async fn text() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain")], TEXT_BODY)
}

async fn binary() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/octet-stream")], BINARY_BODY)
}

async fn empty() -> StatusCode {
    StatusCode::OK
}

async fn slow(Path(millis): Path<u64>) -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(millis)).await;
    Json(json!({ "slept": millis }))
}
