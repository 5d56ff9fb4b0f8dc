//! Device loop error types.

use thiserror::Error;
use wakecal_providers::ProviderError;

use crate::clock::ClockError;

/// Result type for device operations.
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Errors that stop or interrupt the device loop.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The access token could not be obtained or refreshed. Always fatal.
    #[error("unable to refresh access token, has the token been revoked? ({0})")]
    Auth(#[source] ProviderError),

    /// The calendar fetch failed.
    #[error("calendar fetch failed: {0}")]
    Api(#[source] ProviderError),

    /// The clock could not be read.
    #[error(transparent)]
    Clock(#[from] ClockError),

    /// Invalid device configuration.
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl DeviceError {
    /// Wraps a token endpoint failure.
    pub fn auth(error: ProviderError) -> Self {
        Self::Auth(error)
    }

    /// Wraps a calendar fetch failure.
    pub fn api(error: ProviderError) -> Self {
        Self::Api(error)
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Only fetch failures can be retried, and only transient ones.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Api(e) => e.is_retryable(),
            Self::Auth(_) | Self::Clock(_) | Self::Config { .. } => false,
        }
    }
}
