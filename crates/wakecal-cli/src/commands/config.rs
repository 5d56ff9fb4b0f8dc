//! Configuration commands.

use std::path::{Path, PathBuf};

use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Prints the effective configuration as TOML.
pub fn dump(config: &ClientConfig, path: &Path) -> ClientResult<()> {
    println!("# config.toml ({})", path.display());
    println!("{}", config.to_toml()?);
    Ok(())
}

/// Checks that the configuration can start the device loop.
pub fn validate(config: &ClientConfig) -> ClientResult<()> {
    let device = config.device_config()?;
    println!(
        "Device settings are valid (calendar {}, {} rows, alarm {} min before, {} mode).",
        device.calendar_id,
        device.max_events,
        device.wakeup_lead.num_minutes(),
        device.alarm_mode
    );

    if config.google.is_some() {
        config.google_config()?;
        println!("Google settings are valid.");
    } else {
        println!("No [google] section; `run` and `fetch` will not start.");
    }

    println!("Configuration is valid.");
    Ok(())
}

/// Prints the configuration file path in effect.
pub fn path(path: &Path) -> ClientResult<()> {
    println!("config: {}", path.display());
    Ok(())
}

/// The `--config` override, or the default location.
pub fn effective_path(override_path: Option<&Path>) -> PathBuf {
    override_path
        .map(Path::to_path_buf)
        .unwrap_or_else(ClientConfig::default_path)
}
