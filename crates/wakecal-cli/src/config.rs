//! `config.toml` loading.
//!
//! Settings are read once at startup from `~/.config/wakecal/config.toml`
//! (or `--config` / `WAKECAL_CONFIG`). Every section is optional and falls
//! back to its defaults.
//!
//! Credentials in `[google]` support secret references, see
//! [`secret::resolve`](crate::secret::resolve).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use wakecal_core::{DEFAULT_TITLE_WIDTH, TracingOutputFormat};
use wakecal_device::{AlarmMode, DeviceConfig, RetryPolicy, offset_from_minutes};
use wakecal_providers::google::{GoogleConfig, OAuthCredentials};

use crate::error::{ClientError, ClientResult};
use crate::secret;

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Debug logging.
    pub debug: bool,

    pub logging: LoggingSettings,

    pub calendar: CalendarSettings,

    pub display: DisplaySettings,

    pub polling: PollingSettings,

    pub alarm: AlarmSettings,

    pub retry: RetrySettings,

    /// Google account settings. Required by `run` and `fetch`.
    pub google: Option<GoogleSettings>,
}

/// `[logging]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `compact`, `pretty` or `json`.
    pub format: TracingOutputFormat,
}

/// `[calendar]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
    pub calendar_id: String,

    /// Rows on screen and `maxResults` per query.
    pub max_events: usize,

    /// Characters per title line.
    pub title_width: usize,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            calendar_id: "primary".to_string(),
            max_events: 5,
            title_width: DEFAULT_TITLE_WIDTH,
        }
    }
}

/// `[display]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Offset applied to every displayed time, east positive.
    pub utc_offset_minutes: i32,
}

/// `[polling]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingSettings {
    pub interval_secs: u64,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self { interval_secs: 30 }
    }
}

/// `[alarm]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmSettings {
    /// Clip passed to the player.
    pub clip: String,

    pub lead_minutes: i64,

    pub mode: AlarmMode,

    pub late_limit_minutes: i64,

    /// External player; the terminal bell when absent.
    pub player: Option<PlayerSettings>,
}

impl Default for AlarmSettings {
    fn default() -> Self {
        Self {
            clip: "alarm.wav".to_string(),
            lead_minutes: wakecal_core::DEFAULT_WAKEUP_LEAD_MINUTES,
            mode: AlarmMode::default(),
            late_limit_minutes: wakecal_device::DEFAULT_LATE_LIMIT_MINUTES,
            player: None,
        }
    }
}

/// `[alarm.player]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSettings {
    /// Program to spawn, e.g. `aplay`.
    pub command: String,

    /// Arguments; `{clip}` is replaced by the clip, otherwise it is appended.
    #[serde(default)]
    pub args: Vec<String>,
}

/// `[retry]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// 0 stops the loop on the first failed poll.
    pub max_retries: u32,
    pub initial_backoff_secs: u64,
    pub max_backoff_secs: u64,
    pub multiplier: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_retries: policy.max_retries,
            initial_backoff_secs: policy.initial_backoff.as_secs(),
            max_backoff_secs: policy.max_backoff.as_secs(),
            multiplier: policy.multiplier,
        }
    }
}

/// `[google]`
///
/// `client_id`, `client_secret` and `refresh_token` accept `pass::` and
/// `env::` references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleSettings {
    pub client_id: Option<String>,

    pub client_secret: Option<String>,

    pub refresh_token: Option<String>,

    /// Calendar API base URL override.
    pub api_base: Option<String>,

    /// Token endpoint override.
    pub token_url: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GoogleSettings {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            refresh_token: None,
            api_base: None,
            token_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    GoogleConfig::DEFAULT_TIMEOUT_SECS
}

impl ClientConfig {
    /// Loads the default file, or defaults if there is none.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads a specific file; it must exist.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> ClientResult<Self> {
        toml::from_str(content)
            .map_err(|e| ClientError::config(format!("failed to parse config: {}", e)))
    }

    pub fn to_toml(&self) -> ClientResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ClientError::config(format!("failed to serialize config: {}", e)))
    }

    /// `~/.config/wakecal/config.toml`
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wakecal")
    }

    /// Builds and validates the device loop configuration.
    pub fn device_config(&self) -> ClientResult<DeviceConfig> {
        let retry = RetryPolicy::new(self.retry.max_retries).with_backoff(
            Duration::from_secs(self.retry.initial_backoff_secs),
            Duration::from_secs(self.retry.max_backoff_secs),
            self.retry.multiplier,
        );

        let config = DeviceConfig::new(self.calendar.calendar_id.as_str())
            .with_max_events(self.calendar.max_events)
            .with_title_width(self.calendar.title_width)
            .with_utc_offset(offset_from_minutes(self.display.utc_offset_minutes)?)
            .with_poll_interval(Duration::from_secs(self.polling.interval_secs))
            .with_alarm_clip(self.alarm.clip.as_str())
            .with_alarm_mode(self.alarm.mode)
            .with_wakeup_lead(minutes(self.alarm.lead_minutes, "alarm.lead_minutes")?)
            .with_late_limit(minutes(
                self.alarm.late_limit_minutes,
                "alarm.late_limit_minutes",
            )?)
            .with_retry(retry);

        config.validate()?;
        Ok(config)
    }

    /// Builds the Google configuration, resolving secret references.
    pub fn google_config(&self) -> ClientResult<GoogleConfig> {
        let google = self.google.as_ref().ok_or_else(|| {
            ClientError::config(format!(
                "Google settings not found. Add to {}:\n  \
                 [google]\n  \
                 client_id = \"YOUR_ID.apps.googleusercontent.com\"\n  \
                 client_secret = \"YOUR_SECRET\"\n  \
                 refresh_token = \"env::WAKECAL_REFRESH_TOKEN\"",
                Self::default_path().display()
            ))
        })?;
        google.to_google_config()
    }
}

impl GoogleSettings {
    /// Resolves credentials and the refresh token into a [`GoogleConfig`].
    pub fn to_google_config(&self) -> ClientResult<GoogleConfig> {
        let credentials = self.resolve_credentials()?;
        let refresh_token = secret::resolve(required(&self.refresh_token, "refresh_token")?)?;

        let mut config = GoogleConfig::new(credentials, refresh_token)
            .with_timeout(Duration::from_secs(self.timeout_secs));
        if let Some(ref api_base) = self.api_base {
            config = config.with_api_base(api_base.as_str());
        }
        if let Some(ref token_url) = self.token_url {
            config = config.with_token_url(token_url.as_str());
        }

        config.validate().map_err(ClientError::Config)?;
        Ok(config)
    }

    pub(crate) fn resolve_credentials(&self) -> ClientResult<OAuthCredentials> {
        let client_id = secret::resolve(required(&self.client_id, "client_id")?)?;
        let client_secret = secret::resolve(required(&self.client_secret, "client_secret")?)?;
        Ok(OAuthCredentials::new(client_id, client_secret))
    }
}

fn minutes(value: i64, key: &str) -> ClientResult<chrono::Duration> {
    chrono::Duration::try_minutes(value)
        .ok_or_else(|| ClientError::config(format!("{} is out of range", key)))
}

fn required<'a>(value: &'a Option<String>, key: &str) -> ClientResult<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| ClientError::config(format!("{} is missing from the [google] section", key)))
}
