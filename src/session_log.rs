//! Append-only transcript of the session, for display

use std::fmt;

/// Who said a logged line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("you"),
            Self::Assistant => f.write_str("jarvis"),
        }
    }
}

/// One logged line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub speaker: Speaker,
    pub text: String,
}

/// Renders log entries as they are appended
pub trait LogDisplay: Send {
    /// Show `entry`, keeping the newest line in view
    fn show(&mut self, entry: &LogEntry);
}

/// Prints each entry on stdout
#[derive(Debug, Default)]
pub struct StdoutLogDisplay;

impl LogDisplay for StdoutLogDisplay {
    fn show(&mut self, entry: &LogEntry) {
        println!("{}: {}", entry.speaker, entry.text);
    }
}

/// Ordered record of everything said during the session
#[derive(Default)]
pub struct SessionLog {
    entries: Vec<LogEntry>,
    display: Option<Box<dyn LogDisplay>>,
}

impl SessionLog {
    /// Create a log with no display attached
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a log that refreshes `display` on every append
    #[must_use]
    pub fn with_display(display: Box<dyn LogDisplay>) -> Self {
        Self {
            entries: Vec::new(),
            display: Some(display),
        }
    }

    /// Append one entry and refresh the display
    pub fn append(&mut self, speaker: Speaker, text: impl Into<String>) {
        let entry = LogEntry {
            speaker,
            text: text.into(),
        };
        if let Some(display) = self.display.as_mut() {
            display.show(&entry);
        }
        self.entries.push(entry);
    }

    /// All entries, oldest first
    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
