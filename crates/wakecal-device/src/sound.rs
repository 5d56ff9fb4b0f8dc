//! Alarm playback.
//!
//! `play` must return as soon as playback has started; the device loop never
//! waits for a clip to finish.

use std::io::{self, Write};
use std::process::Stdio;

use thiserror::Error;
use tracing::{debug, warn};

/// Placeholder in player arguments replaced with the clip path.
pub const CLIP_PLACEHOLDER: &str = "{clip}";

/// Errors starting playback.
#[derive(Debug, Error)]
pub enum SoundError {
    /// The external player could not be started.
    #[error("failed to start player {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// Writing to the output failed.
    #[error("failed to write to audio output: {0}")]
    Io(#[from] io::Error),
}

/// Something that can start playing a clip.
pub trait SoundPlayer: Send {
    fn play(&mut self, clip: &str) -> Result<(), SoundError>;
}

/// Plays clips by spawning an external command such as `aplay` or `paplay`.
///
/// The clip is substituted for every `{clip}` argument, or appended when no
/// argument contains the placeholder. The child is reaped on a background
/// task. Must be called from within a tokio runtime.
#[derive(Debug, Clone)]
pub struct CommandPlayer {
    program: String,
    args: Vec<String>,
}

impl CommandPlayer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Arguments passed for `clip`.
    pub fn command_args(&self, clip: &str) -> Vec<String> {
        if self.args.iter().any(|a| a.contains(CLIP_PLACEHOLDER)) {
            self.args
                .iter()
                .map(|a| a.replace(CLIP_PLACEHOLDER, clip))
                .collect()
        } else {
            let mut args = self.args.clone();
            args.push(clip.to_string());
            args
        }
    }
}

impl SoundPlayer for CommandPlayer {
    fn play(&mut self, clip: &str) -> Result<(), SoundError> {
        let args = self.command_args(clip);
        debug!(program = %self.program, ?args, "starting player");

        let mut child = tokio::process::Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| SoundError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let program = self.program.clone();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) if !status.success() => {
                    warn!(%program, %status, "player exited with failure");
                }
                Ok(_) => {}
                Err(e) => warn!(%program, error = %e, "failed to wait for player"),
            }
        });
        Ok(())
    }
}

/// Rings the terminal bell. Used when no player is configured.
#[derive(Debug)]
pub struct BellPlayer<W> {
    out: W,
}

impl BellPlayer<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> BellPlayer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> SoundPlayer for BellPlayer<W> {
    fn play(&mut self, clip: &str) -> Result<(), SoundError> {
        debug!(clip, "ringing terminal bell");
        self.out.write_all(b"\x07")?;
        self.out.flush()?;
        Ok(())
    }
}
