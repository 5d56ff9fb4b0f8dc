//! `wakecal run`: the display loop on the host terminal.

use tracing::info;
use wakecal_device::{
    BellPlayer, Capabilities, CommandPlayer, ConsoleRenderer, Controller, SoundPlayer, SystemClock,
};

use crate::config::{AlarmSettings, ClientConfig};
use crate::error::{ClientError, ClientResult};

/// Runs until a fatal error or Ctrl-C.
pub async fn run(config: &ClientConfig) -> ClientResult<()> {
    let device = config.device_config()?;
    let google = config.google_config()?;
    let (auth, fetcher) = super::connect(&google).await?;

    let capabilities = Capabilities {
        clock: Box::new(SystemClock::new()),
        renderer: Box::new(ConsoleRenderer::stdout()),
        player: player_for(&config.alarm),
    };
    let mut controller = Controller::new(device, capabilities, auth, fetcher);

    tokio::select! {
        result = controller.run() => result.map_err(ClientError::from),
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("interrupted, shutting down");
            Ok(())
        }
    }
}

/// The configured external player, or the terminal bell.
fn player_for(alarm: &AlarmSettings) -> Box<dyn SoundPlayer> {
    match alarm.player {
        Some(ref player) => {
            info!(command = %player.command, "using external alarm player");
            Box::new(CommandPlayer::new(player.command.as_str()).with_args(player.args.iter()))
        }
        None => Box::new(BellPlayer::stdout()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_google_section_fails_before_connecting() {
        let err = run(&ClientConfig::default()).await.unwrap_err();
        assert!(err.to_string().contains("Google settings not found"));
    }

    #[tokio::test]
    async fn invalid_device_settings_fail_first() {
        let config = ClientConfig::parse(
            r#"
[calendar]
max_events = 0

[google]
client_id = "abc.apps.googleusercontent.com"
client_secret = "s"
refresh_token = "r"
"#,
        )
        .unwrap();
        let err = run(&config).await.unwrap_err();
        assert!(err.to_string().contains("max_events"));
    }
}
