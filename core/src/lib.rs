//! Shared REST client core.
//!
//! # Overview
//! Builds JSON requests, runs them through a pluggable `Transport`, and
//! normalizes whatever comes back into either a `serde_json::Value` or a
//! single `RestError` type.
//!
//! # Design
//! - `RequestClient::request` is the awaitable primitive;
//!   `request_with_callback` is a spawned adapter over it for callers that
//!   cannot await, so both paths classify responses identically.
//! - Default headers live in a `ClientConfig` owned by the client and are
//!   copied into each request when it is built.
//! - `normalize` is a pure function from `RawResponse` to outcome; the
//!   transport only reports what it observed.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod normalize;
pub mod transport;

pub use client::RequestClient;
pub use config::{AppIdentity, ClientConfig, DeviceClass};
pub use error::{ErrorKind, InvalidHeader, RestError, TransportError, TransportErrorKind};
pub use http::{Method, OutgoingRequest, RawResponse, REQUEST_TIMEOUT};
pub use normalize::{normalize, status_phrase};
pub use transport::{ReqwestTransport, Transport};
