//! Turns a `RawResponse` into a JSON value or a `RestError`.
//!
//! # Design
//! Normalization is a pure function of the raw response and the request URL,
//! so both execution paths share it and it can be tested without a network.
//! Two lenient rules apply: a body that is text but not JSON is still handed
//! back as `{"response": "<text>"}`, and a transport error always outranks an
//! error synthesized from the status code.

use http::StatusCode;
use serde_json::{json, Map, Value};
use url::Url;

use crate::error::{RestError, DESCRIPTION_KEY};
use crate::http::RawResponse;

/// Key wrapping a text body that was not valid JSON.
pub const RAW_TEXT_KEY: &str = "response";

/// Classify a raw transport outcome. Exactly one of value or error results.
pub fn normalize(raw: RawResponse, url: &Url) -> Result<Value, RestError> {
    let RawResponse {
        status,
        body,
        error,
    } = raw;

    let json = body.as_deref().and_then(parse_body);

    if let Some(status) = status.filter(|s| !(200..300).contains(s)) {
        let phrase = status_phrase(status);
        tracing::warn!(
            target: "rest_core::client",
            status,
            phrase,
            body = ?json,
            "request to {url} failed"
        );
        if let Some(error) = error {
            return Err(error.into());
        }
        return Err(RestError::HttpStatus {
            status,
            phrase: phrase.to_string(),
            detail: status_detail(phrase, json),
        });
    }

    if let Some(error) = error {
        return Err(error.into());
    }

    json.ok_or_else(|| RestError::EmptyResponse {
        url: url.to_string(),
    })
}

/// Parse a response body. Empty bodies and bytes that are not UTF-8 give
/// `None`; UTF-8 text that is not JSON is wrapped under `RAW_TEXT_KEY`.
fn parse_body(bytes: &[u8]) -> Option<Value> {
    if bytes.is_empty() {
        return None;
    }
    match serde_json::from_slice(bytes) {
        Ok(value) => Some(value),
        Err(_) => std::str::from_utf8(bytes)
            .ok()
            .map(|text| json!({ RAW_TEXT_KEY: text })),
    }
}

fn status_detail(phrase: &str, json: Option<Value>) -> Map<String, Value> {
    let mut detail = match json {
        Some(Value::Object(fields)) => fields,
        _ => Map::new(),
    };
    detail.insert(DESCRIPTION_KEY.to_string(), Value::from(phrase));
    detail
}

/// Standard reason phrase for a status code. Codes without a registered
/// phrase fall back to a description of their class.
pub fn status_phrase(status: u16) -> &'static str {
    if let Some(reason) = StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
    {
        return reason;
    }
    match status {
        100..=199 => "informational",
        200..=299 => "success",
        300..=399 => "redirected",
        400..=499 => "client error",
        500..=599 => "server error",
        _ => "unknown",
    }
}
