//! OAuth 2.0 refresh-token grant against Google's token endpoint.
//!
//! Only the refresh half of the flow lives here. The refresh token itself is
//! obtained out of band and supplied through configuration.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{ProviderError, ProviderResult};
use crate::http::{BoxFuture, HttpClient, HttpRequest};

use super::config::OAuthCredentials;

/// A freshly issued access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
    /// Lifetime in seconds as reported by the server.
    pub expires_in: Option<u64>,
}

impl TokenGrant {
    pub fn new(access_token: impl Into<String>, expires_in: Option<u64>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_in,
        }
    }
}

/// Something that can trade a refresh token for an access token.
pub trait TokenEndpoint: Send + Sync {
    fn refresh<'a>(&'a self, refresh_token: &'a str) -> BoxFuture<'a, ProviderResult<TokenGrant>>;
}

impl<T: TokenEndpoint + ?Sized> TokenEndpoint for Arc<T> {
    fn refresh<'a>(&'a self, refresh_token: &'a str) -> BoxFuture<'a, ProviderResult<TokenGrant>> {
        (**self).refresh(refresh_token)
    }
}

/// Token endpoint client for Google.
pub struct OAuthClient {
    credentials: OAuthCredentials,
    token_url: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for OAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthClient")
            .field("client_id", &self.credentials.client_id)
            .field("token_url", &self.token_url)
            .finish_non_exhaustive()
    }
}

impl OAuthClient {
    /// Creates a new OAuth client.
    pub fn new(
        credentials: OAuthCredentials,
        token_url: impl Into<String>,
        http: Arc<dyn HttpClient>,
    ) -> Self {
        Self {
            credentials,
            token_url: token_url.into(),
            http,
        }
    }

    async fn refresh_token(&self, refresh_token: &str) -> ProviderResult<TokenGrant> {
        let request = HttpRequest::post_form(
            self.token_url.as_str(),
            [
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ],
        );

        let response = self
            .http
            .send(request)
            .await
            .map_err(|e| e.at_endpoint("oauth"))?;

        if !response.is_success() {
            return Err(ProviderError::authentication(format!(
                "token refresh failed ({}): {}",
                response.status, response.body
            ))
            .at_endpoint("oauth"));
        }

        let token_response: TokenResponse = serde_json::from_str(&response.body).map_err(|e| {
            ProviderError::invalid_response(format!("invalid token response: {}", e))
                .at_endpoint("oauth")
        })?;

        if let Some(error) = token_response.error {
            let detail = token_response.error_description.unwrap_or_default();
            return Err(ProviderError::authentication(format!(
                "token refresh rejected: {} {}",
                error, detail
            ))
            .at_endpoint("oauth"));
        }

        let access_token = token_response.access_token.ok_or_else(|| {
            ProviderError::invalid_response("token response has no access_token")
                .at_endpoint("oauth")
        })?;

        debug!(expires_in = ?token_response.expires_in, "token endpoint answered");
        info!("successfully refreshed access token");
        Ok(TokenGrant::new(access_token, token_response.expires_in))
    }
}

impl TokenEndpoint for OAuthClient {
    fn refresh<'a>(&'a self, refresh_token: &'a str) -> BoxFuture<'a, ProviderResult<TokenGrant>> {
        Box::pin(self.refresh_token(refresh_token))
    }
}

/// Body returned by the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
    error: Option<String>,
    error_description: Option<String>,
}
