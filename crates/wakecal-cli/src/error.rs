//! CLI error types.

use thiserror::Error;
use wakecal_core::TracingError;
use wakecal_device::DeviceError;
use wakecal_providers::ProviderError;

use crate::secret::SecretError;

/// Result type for CLI operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors surfaced to the user as `error: ...`.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration file missing, unreadable or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// A secret reference could not be resolved.
    #[error("configuration error: {0}")]
    Secret(#[from] SecretError),

    /// HTTP client setup or a one-shot provider call failed.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The device loop stopped.
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Logging could not be initialized.
    #[error("failed to initialize logging: {0}")]
    Tracing(#[from] TracingError),
}

impl ClientError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(
            ClientError::config("missing [google] section").to_string(),
            "configuration error: missing [google] section"
        );
        let err = ClientError::from(DeviceError::config("max_events must be at least 1"));
        assert_eq!(
            err.to_string(),
            "configuration error: max_events must be at least 1"
        );
        let err = ClientError::from(ProviderError::network("connection refused"));
        assert_eq!(
            err.to_string(),
            "provider error: network_error: connection refused"
        );
    }
}
