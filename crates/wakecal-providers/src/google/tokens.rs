//! Access token lifecycle.
//!
//! The [`Authenticator`] owns the only copy of the access token. It is
//! obtained once at startup from the configured refresh token and refreshed
//! in place whenever the monotonic clock says it has lived for its full
//! reported lifetime.

use std::fmt;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::ProviderResult;

use super::oauth::{TokenEndpoint, TokenGrant};

/// Lifetime assumed when the token endpoint does not report one.
pub const DEFAULT_EXPIRES_IN: Duration = Duration::from_secs(3600);

/// The current access token and when it was obtained.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessTokenState {
    token: String,
    obtained_at: Instant,
    expires_in: Duration,
}

impl fmt::Debug for AccessTokenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessTokenState")
            .field("token", &"<redacted>")
            .field("obtained_at", &self.obtained_at)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

impl AccessTokenState {
    pub fn new(token: impl Into<String>, obtained_at: Instant, expires_in: Duration) -> Self {
        Self {
            token: token.into(),
            obtained_at,
            expires_in,
        }
    }

    /// Builds the state from a grant received at `now`.
    pub fn from_grant(grant: TokenGrant, now: Instant) -> Self {
        let expires_in = grant
            .expires_in
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_EXPIRES_IN);
        Self::new(grant.access_token, now, expires_in)
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn obtained_at(&self) -> Instant {
        self.obtained_at
    }

    pub fn expires_in(&self) -> Duration {
        self.expires_in
    }

    /// True once `now - obtained_at >= expires_in`.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.obtained_at) >= self.expires_in
    }

    /// Time left before a refresh is due; zero when already due.
    pub fn remaining_at(&self, now: Instant) -> Duration {
        self.expires_in
            .saturating_sub(now.saturating_duration_since(self.obtained_at))
    }
}

/// Owns the refresh token and the current access token.
pub struct Authenticator {
    endpoint: Box<dyn TokenEndpoint>,
    refresh_token: String,
    state: AccessTokenState,
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticator")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Authenticator {
    /// Performs the initial exchange of the refresh token.
    ///
    /// # Errors
    ///
    /// Fails when the endpoint rejects the refresh token or cannot be reached.
    /// Callers treat this as fatal.
    pub async fn initial_token(
        endpoint: Box<dyn TokenEndpoint>,
        refresh_token: impl Into<String>,
        now: Instant,
    ) -> ProviderResult<Self> {
        let refresh_token = refresh_token.into();
        let grant = endpoint.refresh(&refresh_token).await.inspect_err(|e| {
            warn!(error = %e, "unable to obtain access token, has the refresh token been revoked?");
        })?;
        let state = AccessTokenState::from_grant(grant, now);
        info!(expires_in_secs = state.expires_in.as_secs(), "obtained access token");

        Ok(Self {
            endpoint,
            refresh_token,
            state,
        })
    }

    /// Refreshes the access token if it has expired at `now`.
    ///
    /// Returns `Ok(true)` when a refresh happened. On failure the previous
    /// state is left untouched.
    pub async fn ensure_fresh(&mut self, now: Instant) -> ProviderResult<bool> {
        if !self.state.is_expired_at(now) {
            debug!(
                remaining_secs = self.state.remaining_at(now).as_secs(),
                "access token still valid"
            );
            return Ok(false);
        }

        info!("access token expired, refreshing");
        let grant = self.endpoint.refresh(&self.refresh_token).await?;
        self.state = AccessTokenState::from_grant(grant, now);
        Ok(true)
    }

    /// The bearer token for API calls.
    pub fn access_token(&self) -> &str {
        self.state.token()
    }

    pub fn state(&self) -> &AccessTokenState {
        &self.state
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.state.is_expired_at(now)
    }

    pub fn remaining_at(&self, now: Instant) -> Duration {
        self.state.remaining_at(now)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::error::{ProviderError, ProviderErrorCode};
    use crate::testing::ScriptedTokenEndpoint;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    async fn authenticator(
        endpoint: &Arc<ScriptedTokenEndpoint>,
        now: Instant,
    ) -> Authenticator {
        Authenticator::initial_token(Box::new(endpoint.clone()), "rt", now)
            .await
            .unwrap()
    }

    #[test]
    fn state_expiry_boundary() {
        let t0 = Instant::now();
        let state = AccessTokenState::new("tok", t0, secs(3600));

        assert!(!state.is_expired_at(t0));
        assert!(!state.is_expired_at(t0 + secs(3599)));
        assert!(state.is_expired_at(t0 + secs(3600)));
        assert!(state.is_expired_at(t0 + secs(7200)));

        assert_eq!(state.remaining_at(t0 + secs(600)), secs(3000));
        assert_eq!(state.remaining_at(t0 + secs(4000)), Duration::ZERO);
    }

    #[test]
    fn grant_without_expiry_uses_default() {
        let now = Instant::now();
        let state = AccessTokenState::from_grant(TokenGrant::new("tok", None), now);
        assert_eq!(state.expires_in(), DEFAULT_EXPIRES_IN);
        assert_eq!(state.obtained_at(), now);

        let state = AccessTokenState::from_grant(TokenGrant::new("tok", Some(120)), now);
        assert_eq!(state.expires_in(), secs(120));
    }

    #[test]
    fn debug_redacts_token() {
        let state = AccessTokenState::new("super-secret", Instant::now(), secs(1));
        assert!(!format!("{:?}", state).contains("super-secret"));
    }

    #[tokio::test]
    async fn initial_token_uses_refresh_token() {
        let endpoint = Arc::new(ScriptedTokenEndpoint::new());
        endpoint.push_grant("at-1", Some(3600));

        let auth = authenticator(&endpoint, Instant::now()).await;
        assert_eq!(auth.access_token(), "at-1");
        assert_eq!(endpoint.calls(), vec!["rt".to_string()]);
    }

    #[tokio::test]
    async fn initial_token_failure_is_reported() {
        let endpoint = Arc::new(ScriptedTokenEndpoint::new());
        endpoint.push_err(ProviderError::authentication("invalid_grant"));

        let err = Authenticator::initial_token(Box::new(endpoint), "rt", Instant::now())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::AuthenticationFailed);
    }

    #[tokio::test]
    async fn refreshes_exactly_at_boundary() {
        let endpoint = Arc::new(ScriptedTokenEndpoint::new());
        endpoint.push_grant("at-1", Some(3600));
        endpoint.push_grant("at-2", Some(1800));

        let t0 = Instant::now();
        let mut auth = authenticator(&endpoint, t0).await;

        assert!(!auth.ensure_fresh(t0 + secs(3599)).await.unwrap());
        assert_eq!(endpoint.call_count(), 1);
        assert_eq!(auth.access_token(), "at-1");

        assert!(auth.ensure_fresh(t0 + secs(3600)).await.unwrap());
        assert_eq!(endpoint.call_count(), 2);
        assert_eq!(auth.access_token(), "at-2");
        assert_eq!(auth.state().obtained_at(), t0 + secs(3600));
        assert_eq!(auth.state().expires_in(), secs(1800));

        // The new lifetime is measured from the refresh.
        assert!(!auth.is_expired_at(t0 + secs(5399)));
        assert!(auth.is_expired_at(t0 + secs(5400)));
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_state() {
        let endpoint = Arc::new(ScriptedTokenEndpoint::new());
        endpoint.push_grant("at-1", Some(60));
        endpoint.push_err(ProviderError::authentication("revoked"));

        let t0 = Instant::now();
        let mut auth = authenticator(&endpoint, t0).await;

        let err = auth.ensure_fresh(t0 + secs(60)).await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::AuthenticationFailed);
        assert_eq!(auth.access_token(), "at-1");
        assert_eq!(auth.state().obtained_at(), t0);
    }
}
