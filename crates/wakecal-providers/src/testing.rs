//! Scripted capabilities for tests.
//!
//! Enabled for this crate's own tests and for dependents through the
//! `testing` feature.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::{ProviderError, ProviderResult};
use crate::google::{TokenEndpoint, TokenGrant};
use crate::http::{BoxFuture, HttpClient, HttpRequest, HttpResponse};

/// An [`HttpClient`] that replays queued responses and records requests.
///
/// When the queue runs dry every further request fails with a network error.
#[derive(Debug, Default)]
pub struct ScriptedHttpClient {
    responses: Mutex<VecDeque<ProviderResult<HttpResponse>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, response: HttpResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn push_ok(&self, body: impl Into<String>) {
        self.push(HttpResponse::ok(body));
    }

    pub fn push_err(&self, error: ProviderError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// All requests sent so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, ProviderResult<HttpResponse>> {
        self.requests.lock().unwrap().push(request);
        let next = self.responses.lock().unwrap().pop_front();
        Box::pin(async move {
            next.unwrap_or_else(|| Err(ProviderError::network("no scripted response left")))
        })
    }
}

/// A [`TokenEndpoint`] that replays queued grants.
#[derive(Debug, Default)]
pub struct ScriptedTokenEndpoint {
    grants: Mutex<VecDeque<ProviderResult<TokenGrant>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTokenEndpoint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_grant(&self, access_token: &str, expires_in: Option<u64>) {
        self.grants
            .lock()
            .unwrap()
            .push_back(Ok(TokenGrant::new(access_token, expires_in)));
    }

    pub fn push_err(&self, error: ProviderError) {
        self.grants.lock().unwrap().push_back(Err(error));
    }

    /// Refresh tokens passed to `refresh`, oldest first.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl TokenEndpoint for ScriptedTokenEndpoint {
    fn refresh<'a>(&'a self, refresh_token: &'a str) -> BoxFuture<'a, ProviderResult<TokenGrant>> {
        self.calls.lock().unwrap().push(refresh_token.to_string());
        let next = self.grants.lock().unwrap().pop_front();
        Box::pin(async move {
            next.unwrap_or_else(|| Err(ProviderError::authentication("no scripted grant left")))
        })
    }
}
