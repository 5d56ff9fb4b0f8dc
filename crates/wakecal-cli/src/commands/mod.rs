//! Subcommand implementations.

pub mod config;
pub mod fetch;
pub mod run;

use std::sync::Arc;

use tokio::time::Instant;
use wakecal_device::DeviceError;
use wakecal_providers::google::{Authenticator, CalendarFetcher, GoogleConfig, OAuthClient};
use wakecal_providers::{HttpClient, ReqwestClient};

use crate::error::ClientResult;

/// Builds the HTTP stack and performs the initial token exchange.
///
/// A rejected refresh token is reported as a device auth error, the same way
/// the loop reports a failed refresh.
pub(crate) async fn connect(google: &GoogleConfig) -> ClientResult<(Authenticator, CalendarFetcher)> {
    let http: Arc<dyn HttpClient> = Arc::new(ReqwestClient::new(google.timeout)?);
    let endpoint = OAuthClient::new(
        google.credentials.clone(),
        google.token_url.as_str(),
        Arc::clone(&http),
    );

    let auth = Authenticator::initial_token(
        Box::new(endpoint),
        google.refresh_token.as_str(),
        Instant::now(),
    )
    .await
    .map_err(DeviceError::auth)?;

    Ok((auth, CalendarFetcher::from_config(http, google)))
}
