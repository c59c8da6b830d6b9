//! The shared REST client: request building and dual-path execution.
//!
//! # Design
//! `RequestClient` owns its configuration behind a lock and a handle to the
//! runtime used for callback delivery. Cloning a client is cheap and clones
//! share both the transport and the default headers.
//!
//! The awaitable `request` is the primitive. `request_with_callback` spawns a
//! task that runs `request` and forwards the outcome, so both paths classify
//! every response the same way. Address validation and body serialization run
//! inside that task too, and their failures reach the callback like any other
//! error.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use tokio::runtime::Handle;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{InvalidHeader, RestError};
use crate::http::{Method, OutgoingRequest};
use crate::normalize::normalize;
use crate::transport::{ReqwestTransport, Transport};

pub const CONTENT_TYPE_JSON: &str = "application/json";

pub struct RequestClient<T> {
    transport: Arc<T>,
    config: Arc<RwLock<ClientConfig>>,
    runtime: Handle,
}

impl<T> Clone for RequestClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            config: Arc::clone(&self.config),
            runtime: self.runtime.clone(),
        }
    }
}

impl RequestClient<ReqwestTransport> {
    /// Client over a default `reqwest` transport.
    pub fn with_reqwest(config: ClientConfig, runtime: Handle) -> Self {
        Self::new(ReqwestTransport::new(), config, runtime)
    }
}

impl<T: Transport + 'static> RequestClient<T> {
    /// `runtime` is where callback-style requests run and complete.
    pub fn new(transport: T, config: ClientConfig, runtime: Handle) -> Self {
        Self {
            transport: Arc::new(transport),
            config: Arc::new(RwLock::new(config)),
            runtime,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Copy of the current configuration.
    pub fn config(&self) -> ClientConfig {
        self.config.read().clone()
    }

    /// Set a header sent with every request built from now on.
    ///
    /// Fails without touching the current headers if `name` or `value` could
    /// not be put on the wire.
    pub fn set_default_header(
        &self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), InvalidHeader> {
        self.config.write().set_default_header(name, value)
    }

    pub fn remove_default_header(&self, name: &str) -> Option<String> {
        self.config.write().remove_default_header(name)
    }

    pub fn default_headers(&self) -> BTreeMap<String, String> {
        self.config.read().default_headers().clone()
    }

    /// Validate `address`, serialize `body` and assemble headers.
    ///
    /// The address is checked before anything else. Headers are
    /// `Content-Type`, `User-Agent`, then every default header, appended.
    pub fn build_request<B>(
        &self,
        address: &str,
        method: Method,
        body: Option<&B>,
    ) -> Result<OutgoingRequest, RestError>
    where
        B: Serialize + ?Sized,
    {
        let url = Url::parse(address).map_err(|source| RestError::InvalidAddress {
            address: address.to_string(),
            source,
        })?;

        let body = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(RestError::Serialization)?;

        let config = self.config.read().clone();
        let mut headers = Vec::with_capacity(config.default_headers().len() + 2);
        headers.push(("Content-Type".to_string(), CONTENT_TYPE_JSON.to_string()));
        headers.push(("User-Agent".to_string(), config.identity.user_agent()));
        headers.extend(
            config
                .default_headers()
                .iter()
                .map(|(name, value)| (name.clone(), value.clone())),
        );

        Ok(OutgoingRequest::new(url, method, headers, body))
    }

    /// Build and send a request, returning the parsed JSON response.
    pub async fn request<B>(
        &self,
        address: &str,
        method: Method,
        body: Option<&B>,
    ) -> Result<Value, RestError>
    where
        B: Serialize + ?Sized,
    {
        let request = self.build_request(address, method, body)?;
        self.send(&request).await
    }

    pub async fn get(&self, address: &str) -> Result<Value, RestError> {
        self.request::<Value>(address, Method::Get, None).await
    }

    pub async fn delete(&self, address: &str) -> Result<Value, RestError> {
        self.request::<Value>(address, Method::Delete, None).await
    }

    /// Send an already built request.
    pub async fn send(&self, request: &OutgoingRequest) -> Result<Value, RestError> {
        tracing::debug!(target: "rest_core::client", "{}: {}", request.method(), request.url());
        let raw = self.transport.send(request).await;
        normalize(raw, request.url())
    }

    /// Callback form of `request`.
    ///
    /// Returns immediately. All work, including address validation, happens
    /// on the client's runtime, and `on_complete` is invoked once from there
    /// with exactly one of its arguments set.
    ///
    /// If that runtime has already shut down the task is discarded and
    /// `on_complete` is dropped without being called.
    pub fn request_with_callback<B, F>(
        &self,
        address: &str,
        method: Method,
        body: Option<B>,
        on_complete: F,
    ) where
        B: Serialize + Send + Sync + 'static,
        F: FnOnce(Option<Value>, Option<RestError>) + Send + 'static,
    {
        let client = self.clone();
        let address = address.to_string();
        self.runtime.spawn(async move {
            let outcome = client.request(&address, method, body.as_ref()).await;
            deliver(outcome, on_complete);
        });
    }

    /// Callback form of `send`. Shares the runtime caveat of
    /// `request_with_callback`.
    pub fn send_with_callback<F>(&self, request: OutgoingRequest, on_complete: F)
    where
        F: FnOnce(Option<Value>, Option<RestError>) + Send + 'static,
    {
        let client = self.clone();
        self.runtime.spawn(async move {
            let outcome = client.send(&request).await;
            deliver(outcome, on_complete);
        });
    }
}

fn deliver<F>(outcome: Result<Value, RestError>, on_complete: F)
where
    F: FnOnce(Option<Value>, Option<RestError>),
{
    match outcome {
        Ok(json) => on_complete(Some(json), None),
        Err(error) => on_complete(None, Some(error)),
    }
}
