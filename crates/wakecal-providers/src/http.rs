//! Network transport capability.
//!
//! The fetcher and the token endpoint only ever need two request shapes:
//! a GET with query parameters and a bearer token, and a form-encoded POST.
//! [`HttpClient`] abstracts over both so tests can script responses without
//! a network.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tracing::trace;

use crate::error::{ProviderError, ProviderErrorCode, ProviderResult};

/// A boxed future that is Send and has a lifetime tied to the borrowed data.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// HTTP method used by a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// An outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    /// Query string pairs, not yet encoded.
    pub query: Vec<(String, String)>,
    /// Form body pairs for POST requests.
    pub form: Vec<(String, String)>,
    /// Bearer token sent in the `Authorization` header.
    pub bearer: Option<String>,
}

impl HttpRequest {
    /// Creates a GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            query: Vec::new(),
            form: Vec::new(),
            bearer: None,
        }
    }

    /// Creates a form-encoded POST request.
    pub fn post_form<K, V>(url: impl Into<String>, form: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            query: Vec::new(),
            form: form
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            bearer: None,
        }
    }

    /// Appends a query parameter.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Sets the bearer token.
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    /// Looks up a query parameter by name.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Looks up a form field by name.
    pub fn form_value(&self, key: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A received response. The body is read fully before it is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Shorthand for a 200 response.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Network transport used by the calendar fetcher and the OAuth client.
///
/// Transport failures (DNS, connect, timeout) are reported as
/// [`ProviderErrorCode::NetworkError`](crate::ProviderErrorCode::NetworkError);
/// non-2xx statuses are returned as responses so callers can inspect the body.
pub trait HttpClient: Send + Sync {
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, ProviderResult<HttpResponse>>;
}

/// [`HttpClient`] backed by reqwest with rustls.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    inner: reqwest::Client,
}

impl ReqwestClient {
    /// Builds a client with the given per-request timeout.
    pub fn new(timeout: Duration) -> ProviderResult<Self> {
        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("wakecal/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ProviderError::new(
                    ProviderErrorCode::ConfigurationError,
                    "failed to create HTTP client",
                )
                .with_source(e)
            })?;
        Ok(Self { inner })
    }
}

impl HttpClient for ReqwestClient {
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, ProviderResult<HttpResponse>> {
        Box::pin(async move {
            trace!(method = ?request.method, url = %request.url, "sending request");

            let mut builder = match request.method {
                HttpMethod::Get => self.inner.get(&request.url),
                HttpMethod::Post => self.inner.post(&request.url).form(&request.form),
            };
            if !request.query.is_empty() {
                builder = builder.query(&request.query);
            }
            if let Some(ref token) = request.bearer {
                builder = builder.bearer_auth(token);
            }

            let response = builder.send().await.map_err(|e| {
                let message = if e.is_timeout() {
                    "request timeout".to_string()
                } else if e.is_connect() {
                    format!("connection failed: {}", e)
                } else {
                    format!("request failed: {}", e)
                };
                ProviderError::network(message).with_source(e)
            })?;

            let status = response.status().as_u16();
            let body = response.text().await.map_err(|e| {
                ProviderError::network(format!("failed to read response: {}", e)).with_source(e)
            })?;

            Ok(HttpResponse { status, body })
        })
    }
}
