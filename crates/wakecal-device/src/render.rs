//! Screen label slots and the renderer capability.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;

use tracing::warn;

/// A fixed text slot on the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Label {
    /// Date line at the top.
    Header,
    /// `HH:MM` clock in the top-right corner.
    Clock,
    /// Start time column of event row `n`.
    EventTime(usize),
    /// Title column of event row `n`.
    EventTitle(usize),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header => write!(f, "header"),
            Self::Clock => write!(f, "clock"),
            Self::EventTime(i) => write!(f, "event[{}].time", i),
            Self::EventTitle(i) => write!(f, "event[{}].title", i),
        }
    }
}

/// Something that can show text in a label slot.
pub trait Renderer: Send {
    fn set_text(&mut self, label: Label, text: &str);
}

/// Renders labels as lines on a writer, printing only labels whose text changed.
///
/// Multi-line titles are printed with ` / ` between lines.
#[derive(Debug)]
pub struct ConsoleRenderer<W> {
    out: W,
    labels: BTreeMap<Label, String>,
}

impl ConsoleRenderer<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            labels: BTreeMap::new(),
        }
    }

    /// Current text of every label set so far.
    pub fn labels(&self) -> &BTreeMap<Label, String> {
        &self.labels
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> Renderer for ConsoleRenderer<W> {
    fn set_text(&mut self, label: Label, text: &str) {
        if self.labels.get(&label).is_some_and(|current| current == text) {
            return;
        }
        self.labels.insert(label, text.to_string());

        let line = format!("{:<16}{}", label.to_string(), text.replace('\n', " / "));
        if let Err(e) = writeln!(self.out, "{}", line.trim_end()).and_then(|()| self.out.flush()) {
            warn!(%label, error = %e, "failed to write label");
        }
    }
}
