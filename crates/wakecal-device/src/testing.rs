//! Recording capabilities shared by this crate's tests.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::render::{Label, Renderer};
use crate::sound::{SoundError, SoundPlayer};

/// A [`Renderer`] whose labels can be inspected from the test after the
/// presenter has taken ownership of a clone.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    labels: Arc<Mutex<BTreeMap<Label, String>>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current text of `label`; empty if never set.
    pub fn text(&self, label: Label) -> String {
        self.labels
            .lock()
            .unwrap()
            .get(&label)
            .cloned()
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> BTreeMap<Label, String> {
        self.labels.lock().unwrap().clone()
    }

    /// One `label: text` line per label, title lines joined with ` | `.
    pub fn screen(&self) -> String {
        self.snapshot()
            .iter()
            .map(|(label, text)| {
                format!("{}: {}", label, text.replace('\n', " | "))
                    .trim_end()
                    .to_string()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Renderer for RecordingRenderer {
    fn set_text(&mut self, label: Label, text: &str) {
        self.labels.lock().unwrap().insert(label, text.to_string());
    }
}

/// A [`SoundPlayer`] that records every clip it was asked to play.
#[derive(Debug, Clone, Default)]
pub struct RecordingPlayer {
    played: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl RecordingPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A player whose every `play` fails after recording the clip.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn played(&self) -> Vec<String> {
        self.played.lock().unwrap().clone()
    }
}

impl SoundPlayer for RecordingPlayer {
    fn play(&mut self, clip: &str) -> Result<(), SoundError> {
        self.played.lock().unwrap().push(clip.to_string());
        if self.fail {
            return Err(SoundError::Io(std::io::Error::other("speaker unplugged")));
        }
        Ok(())
    }
}
