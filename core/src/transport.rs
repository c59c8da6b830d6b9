//! The byte-oriented transport seam and its reqwest implementation.
//!
//! # Design
//! A transport never fails as a Rust error: everything it observes (status,
//! body bytes, failure) is reported inside a `RawResponse`, and interpreting
//! that combination is left to `normalize`. This keeps status handling in one
//! place no matter which transport is plugged in.

use async_trait::async_trait;

use crate::error::{TransportError, TransportErrorKind};
use crate::http::{Method, OutgoingRequest, RawResponse};

/// Sends one request and reports what happened.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &OutgoingRequest) -> RawResponse;
}

/// HTTP transport backed by `reqwest`.
///
/// Non-2xx statuses are returned as data, not as errors. Headers are appended
/// rather than inserted so repeated names all reach the server. The request's
/// timeout is applied per request.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured reqwest client (proxy, TLS roots, redirect policy).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn to_reqwest_method(method: Method) -> reqwest::Method {
        match method {
            Method::Delete => reqwest::Method::DELETE,
            Method::Get => reqwest::Method::GET,
            Method::Patch => reqwest::Method::PATCH,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
        }
    }

    fn build(&self, request: &OutgoingRequest) -> Result<reqwest::Request, TransportError> {
        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method()), request.url().clone())
            .timeout(request.timeout());

        let mut headers = reqwest::header::HeaderMap::new();
        for (name, value) in request.headers() {
            let name = reqwest::header::HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                TransportError::new(
                    TransportErrorKind::Other,
                    format!("invalid header name `{name}`"),
                )
                .with_source(e)
            })?;
            let value = reqwest::header::HeaderValue::from_str(value).map_err(|e| {
                TransportError::new(
                    TransportErrorKind::Other,
                    format!("invalid value for header `{name}`"),
                )
                .with_source(e)
            })?;
            headers.append(name, value);
        }
        builder = builder.headers(headers);

        if let Some(body) = request.body() {
            builder = builder.body(body.to_vec());
        }
        builder.build().map_err(TransportError::from)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &OutgoingRequest) -> RawResponse {
        let built = match self.build(request) {
            Ok(built) => built,
            Err(e) => return RawResponse::failed(e),
        };

        let response = match self.client.execute(built).await {
            Ok(response) => response,
            Err(e) => return RawResponse::failed(e.into()),
        };

        let status = response.status().as_u16();
        match response.bytes().await {
            Ok(bytes) => RawResponse::received(status, bytes.to_vec()),
            Err(e) => RawResponse {
                status: Some(status),
                body: None,
                error: Some(e.into()),
            },
        }
    }
}
