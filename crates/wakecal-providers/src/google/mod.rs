//! Google Calendar access.
//!
//! - [`CalendarFetcher`] lists events in a [`TimeWindow`](wakecal_core::TimeWindow)
//! - [`OAuthClient`] trades the configured refresh token for access tokens
//! - [`Authenticator`] keeps the current access token fresh
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use wakecal_providers::google::{Authenticator, CalendarFetcher, GoogleConfig, OAuthClient};
//! use wakecal_providers::ReqwestClient;
//!
//! let http = Arc::new(ReqwestClient::new(config.timeout)?);
//! let oauth = OAuthClient::new(config.credentials.clone(), &config.token_url, http.clone());
//! let mut auth = Authenticator::initial_token(Box::new(oauth), &config.refresh_token, Instant::now()).await?;
//!
//! let fetcher = CalendarFetcher::from_config(http, &config);
//! let batch = fetcher.fetch("primary", 5, &TimeWindow::next_day(now), auth.access_token()).await?;
//! ```

mod client;
mod config;
mod oauth;
mod tokens;

pub use client::{CalendarFetcher, parse_event_list};
pub use config::{GoogleConfig, OAuthCredentials};
pub use oauth::{OAuthClient, TokenEndpoint, TokenGrant};
pub use tokens::{AccessTokenState, Authenticator, DEFAULT_EXPIRES_IN};
