//! HTTP request and response values exchanged with the transport.
//!
//! # Design
//! `OutgoingRequest` is built once by `RequestClient::build_request` and never
//! mutated afterwards; its fields are private so a request that went through
//! address validation and header assembly cannot be altered on its way to the
//! transport. `RawResponse` is the opposite: plain public data describing
//! whatever the transport managed to observe, in any combination.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::error::TransportError;

/// Timeout applied to every request. There is no per-request override.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Delete,
    Get,
    Patch,
    Post,
    Put,
}

impl Method {
    /// The verb as it appears on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Delete => "DELETE",
            Method::Get => "GET",
            Method::Patch => "PATCH",
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a verb string names no supported method.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported HTTP method `{0}`")]
pub struct UnknownMethod(pub String);

impl FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DELETE" => Ok(Method::Delete),
            "GET" => Ok(Method::Get),
            "PATCH" => Ok(Method::Patch),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            _ => Err(UnknownMethod(s.to_string())),
        }
    }
}

/// A fully configured request, ready for the transport.
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    url: Url,
    method: Method,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
    timeout: Duration,
}

impl OutgoingRequest {
    pub(crate) fn new(
        url: Url,
        method: Method,
        headers: Vec<(String, String)>,
        body: Option<Vec<u8>>,
    ) -> Self {
        Self {
            url,
            method,
            headers,
            body,
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Headers in the order they are sent. Names may repeat.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// All values sent under `name`, compared case-insensitively.
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Serialized JSON body, if one was supplied.
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// What the transport observed for one request.
///
/// `status` is `None` when the transport failed before a response arrived.
/// A status with no body, or a status together with an error (e.g. the body
/// stream broke), are both legitimate.
#[derive(Debug, Default)]
pub struct RawResponse {
    pub status: Option<u16>,
    pub body: Option<Vec<u8>>,
    pub error: Option<TransportError>,
}

impl RawResponse {
    /// A response that carried a status and (possibly empty) body.
    pub fn received(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: Some(status),
            body: Some(body.into()),
            error: None,
        }
    }

    /// A transport failure before any response was received.
    pub fn failed(error: TransportError) -> Self {
        Self {
            status: None,
            body: None,
            error: Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_maps_to_verb() {
        assert_eq!(Method::Delete.as_str(), "DELETE");
        assert_eq!(Method::Get.as_str(), "GET");
        assert_eq!(Method::Patch.as_str(), "PATCH");
        assert_eq!(Method::Post.as_str(), "POST");
        assert_eq!(Method::Put.to_string(), "PUT");
    }

    #[test]
    fn method_parses_case_insensitively() {
        assert_eq!("patch".parse::<Method>().unwrap(), Method::Patch);
        assert_eq!("Get".parse::<Method>().unwrap(), Method::Get);
        let err = "TRACE".parse::<Method>().unwrap_err();
        assert_eq!(err, UnknownMethod("TRACE".to_string()));
    }

    #[test]
    fn outgoing_request_uses_fixed_timeout() {
        let url = Url::parse("https://api.example.com/x").unwrap();
        let req = OutgoingRequest::new(url, Method::Get, Vec::new(), None);
        assert_eq!(req.timeout(), Duration::from_secs(120));
        assert!(req.body().is_none());
    }

    #[test]
    fn header_values_keeps_duplicates() {
        let url = Url::parse("https://api.example.com/x").unwrap();
        let headers = vec![
            ("X-Tag".to_string(), "a".to_string()),
            ("Accept".to_string(), "*/*".to_string()),
            ("x-tag".to_string(), "b".to_string()),
        ];
        let req = OutgoingRequest::new(url, Method::Get, headers, None);
        let tags: Vec<&str> = req.header_values("X-TAG").collect();
        assert_eq!(tags, vec!["a", "b"]);
    }
}
