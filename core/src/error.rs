//! Error types for the REST client.
//!
//! # Design
//! Every failure a caller can observe is a `RestError`, whichever execution
//! path produced it. Construction-time failures (`InvalidAddress`,
//! `Serialization`) never reach the transport. `HttpStatus` carries the body's
//! top-level fields as a typed JSON map so callers can read server-provided
//! messages without re-parsing anything.

use std::error::Error as StdError;

use serde_json::{Map, Value};

/// Key under which the status phrase is stored in `HttpStatus::detail`.
pub const DESCRIPTION_KEY: &str = "description";

/// Errors returned by `RequestClient`.
#[derive(Debug, thiserror::Error)]
pub enum RestError {
    /// The address did not parse as a well-formed URL.
    #[error("invalid address `{address}`: {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: url::ParseError,
    },

    /// The request body could not be encoded as JSON.
    #[error("failed to serialize request body: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The transport failed (DNS, connect, TLS, timeout, broken body).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a status outside `200..300`.
    #[error("HTTP {status}: {phrase}")]
    HttpStatus {
        status: u16,
        phrase: String,
        detail: Map<String, Value>,
    },

    /// A success status with no usable body.
    #[error("missing data in response from {url}")]
    EmptyResponse { url: String },
}

/// Field-less classification of a `RestError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidAddress,
    Serialization,
    Transport,
    HttpStatus,
    EmptyResponse,
}

impl RestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RestError::InvalidAddress { .. } => ErrorKind::InvalidAddress,
            RestError::Serialization(_) => ErrorKind::Serialization,
            RestError::Transport(_) => ErrorKind::Transport,
            RestError::HttpStatus { .. } => ErrorKind::HttpStatus,
            RestError::EmptyResponse { .. } => ErrorKind::EmptyResponse,
        }
    }

    /// The HTTP status, for `HttpStatus` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            RestError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Structured detail, for `HttpStatus` errors.
    pub fn detail(&self) -> Option<&Map<String, Value>> {
        match self {
            RestError::HttpStatus { detail, .. } => Some(detail),
            _ => None,
        }
    }
}

/// A default header that cannot be sent: the name is not a valid header
/// token or the value contains bytes HTTP does not allow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid header `{name}`: {reason}")]
pub struct InvalidHeader {
    pub name: String,
    pub reason: &'static str,
}

impl InvalidHeader {
    /// Check `name` and `value` the way the transport will.
    pub fn check(name: &str, value: &str) -> Result<(), InvalidHeader> {
        let reason = if ::http::HeaderName::from_bytes(name.as_bytes()).is_err() {
            "invalid header name"
        } else if ::http::HeaderValue::from_str(value).is_err() {
            "invalid header value"
        } else {
            return Ok(());
        };
        Err(InvalidHeader {
            name: name.to_string(),
            reason,
        })
    }
}

/// Broad category of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    /// The 120 second request timeout elapsed.
    Timeout,
    /// Name resolution, connection or TLS setup failed.
    Connect,
    /// The response started but its body could not be read.
    Body,
    Other,
}

/// A failure reported by the transport. The underlying cause, when there is
/// one, is kept as the `source()` for diagnostics.
#[derive(Debug, thiserror::Error)]
#[error("transport error ({kind:?}): {message}")]
pub struct TransportError {
    kind: TransportErrorKind,
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            TransportErrorKind::Timeout
        } else if err.is_connect() {
            TransportErrorKind::Connect
        } else if err.is_body() || err.is_decode() {
            TransportErrorKind::Body
        } else {
            TransportErrorKind::Other
        };
        TransportError::new(kind, err.to_string()).with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        let err = RestError::EmptyResponse {
            url: "https://api.example.com/x".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::EmptyResponse);
        assert!(err.status().is_none());

        let err = RestError::from(TransportError::new(TransportErrorKind::Timeout, "timed out"));
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn http_status_exposes_status_and_detail() {
        let mut detail = Map::new();
        detail.insert("message".to_string(), Value::from("not found"));
        let err = RestError::HttpStatus {
            status: 404,
            phrase: "Not Found".to_string(),
            detail,
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.detail().unwrap()["message"], "not found");
        assert_eq!(err.to_string(), "HTTP 404: Not Found");
    }

    #[test]
    fn transport_error_preserves_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = TransportError::new(TransportErrorKind::Connect, "connect failed").with_source(io);
        assert_eq!(err.kind(), TransportErrorKind::Connect);
        assert_eq!(err.message(), "connect failed");
        let source = StdError::source(&err).unwrap();
        assert_eq!(source.to_string(), "refused");
    }

    #[test]
    fn header_check_rejects_bad_names_and_values() {
        assert!(InvalidHeader::check("X-Api-Key", "k1").is_ok());

        let err = InvalidHeader::check("bad header", "x").unwrap_err();
        assert_eq!(err.reason, "invalid header name");
        assert_eq!(err.to_string(), "invalid header `bad header`: invalid header name");

        assert_eq!(InvalidHeader::check("", "x").unwrap_err().reason, "invalid header name");
        assert_eq!(
            InvalidHeader::check("X-Trace", "line\nbreak").unwrap_err().reason,
            "invalid header value"
        );
    }

    #[test]
    fn invalid_address_names_the_address() {
        let source = url::Url::parse("not a url").unwrap_err();
        let err = RestError::InvalidAddress {
            address: "not a url".to_string(),
            source,
        };
        assert!(err.to_string().starts_with("invalid address `not a url`"));
    }
}
