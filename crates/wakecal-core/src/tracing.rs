//! Logging setup for wakecal.
//!
//! The binary calls [`init_tracing`] once at startup. `RUST_LOG` overrides
//! the level chosen here unless an explicit directive is set. Output goes to
//! stderr so it never interleaves with the console renderer on stdout.
//!
//! ```ignore
//! use wakecal_core::tracing::{init_tracing, TracingConfig};
//!
//! init_tracing(TracingConfig::device())?;
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Debug, Error)]
pub enum TracingError {
    #[error("a global tracing subscriber is already installed: {0}")]
    AlreadySet(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("invalid log filter directive: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
}

/// Log line layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TracingOutputFormat {
    #[default]
    Compact,
    Pretty,
    /// One JSON object per line, for log shippers on the device.
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Level for the wakecal crates when neither `RUST_LOG` nor `directive` is set.
    pub level: Level,
    pub format: TracingOutputFormat,
    /// Adds file and line to every event.
    pub with_location: bool,
    /// Explicit `EnvFilter` directive; wins over `RUST_LOG`.
    pub directive: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self::device()
    }
}

impl TracingConfig {
    /// Info level, compact lines.
    #[must_use]
    pub fn device() -> Self {
        Self {
            level: Level::INFO,
            format: TracingOutputFormat::Compact,
            with_location: false,
            directive: None,
        }
    }

    /// Debug level with source locations.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            level: Level::DEBUG,
            with_location: true,
            ..Self::device()
        }
    }

    #[must_use]
    pub fn for_verbosity(debug: bool) -> Self {
        if debug { Self::debug() } else { Self::device() }
    }

    #[must_use]
    pub fn with_format(mut self, format: TracingOutputFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directive = Some(directive.into());
        self
    }

    fn filter(&self) -> Result<EnvFilter, TracingError> {
        match self.directive {
            Some(ref directive) => Ok(EnvFilter::try_new(directive)?),
            None => Ok(EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("wakecal={}", self.level)))),
        }
    }
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Fails when a subscriber is already installed or the directive does not
/// parse.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let filter = config.filter()?;

    let base = fmt::layer()
        .with_writer(std::io::stderr)
        .with_file(config.with_location)
        .with_line_number(config.with_location);
    let layer = match config.format {
        TracingOutputFormat::Compact => base.compact().boxed(),
        TracingOutputFormat::Pretty => base.pretty().boxed(),
        TracingOutputFormat::Json => base.json().boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(filter).with(layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets() {
        let device = TracingConfig::default();
        assert_eq!(device, TracingConfig::device());
        assert_eq!(device.level, Level::INFO);
        assert!(!device.with_location);

        let debug = TracingConfig::for_verbosity(true);
        assert_eq!(debug.level, Level::DEBUG);
        assert!(debug.with_location);
        assert_eq!(debug.format, TracingOutputFormat::Compact);
    }

    #[test]
    fn directive_wins() {
        let config = TracingConfig::device().with_directive("wakecal_device=trace");
        let filter = config.filter().unwrap();
        assert!(filter.to_string().contains("wakecal_device=trace"));
    }

    #[test]
    fn bad_directive_is_an_error() {
        let config = TracingConfig::device().with_directive("wakecal=notalevel");
        assert!(matches!(config.filter(), Err(TracingError::Filter(_))));
    }

    #[test]
    fn format_names() {
        let format: TracingOutputFormat = serde_json::from_str(r#""json""#).unwrap();
        assert_eq!(format, TracingOutputFormat::Json);
        let config = TracingConfig::device().with_format(format);
        assert_eq!(config.format, TracingOutputFormat::Json);
    }
}
