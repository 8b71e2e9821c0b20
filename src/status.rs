//! Status display
//!
//! Write-only sink for human-readable status lines and notices. Nothing in the
//! assistant reads status back.

use std::fmt;
use std::sync::Mutex;

use crate::voice::RecognitionError;

/// Coarse assistant state shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Waiting for the user to start listening
    Idle,
    /// A recognition session is active
    Listening,
    /// A chat request is in flight
    Connecting,
    /// The last chat request completed
    Ready,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Idle => "Press Enter to start",
            Self::Listening => "Listening...",
            Self::Connecting => "Connecting to ChatGPT...",
            Self::Ready => "Press Enter to start talking",
        };
        f.write_str(text)
    }
}

/// One-off message surfaced to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// No credential is configured
    CredentialRequired,
    /// A credential was stored
    CredentialSaved,
    /// A blank credential was rejected
    CredentialBlank,
    /// The service rejected the credential, which has been erased
    CredentialInvalid,
    /// The chat service could not be reached
    NetworkError,
    /// Any other chat service failure
    ServiceError,
    /// Recognition ended with an error
    Recognition(RecognitionError),
    /// The speech sink failed
    SpeechFailed(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CredentialRequired => f.write_str(
                "API key required: run `jarvis set-key` to enable enhanced conversations.",
            ),
            Self::CredentialSaved => f.write_str("API key has been saved successfully!"),
            Self::CredentialBlank => f.write_str("Please enter a valid API key"),
            Self::CredentialInvalid => {
                f.write_str("Invalid API key. Please check your API key and try again.")
            }
            Self::NetworkError => {
                f.write_str("Network error. Please check your internet connection.")
            }
            Self::ServiceError => f.write_str("An error occurred while connecting to ChatGPT."),
            Self::Recognition(err) => f.write_str(&err.user_message()),
            Self::SpeechFailed(reason) => write!(f, "Could not speak the reply: {reason}"),
        }
    }
}

/// Destination for status updates and notices
pub trait StatusSink: Send + Sync {
    /// Replace the current status line
    fn status(&self, status: Status);

    /// Show a notice
    fn notice(&self, notice: Notice);
}

/// Writes status to stderr and mirrors it into the log
#[derive(Debug, Default)]
pub struct TerminalStatus;

impl StatusSink for TerminalStatus {
    fn status(&self, status: Status) {
        tracing::debug!(%status, "status");
        eprintln!("[{status}]");
    }

    fn notice(&self, notice: Notice) {
        tracing::info!(%notice, "notice");
        eprintln!("! {notice}");
    }
}

/// Keeps every update in memory; handy for tests and headless callers
#[derive(Debug, Default)]
pub struct RecordedStatus {
    statuses: Mutex<Vec<Status>>,
    notices: Mutex<Vec<Notice>>,
}

impl RecordedStatus {
    /// Create an empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Statuses seen so far, oldest first
    #[must_use]
    pub fn statuses(&self) -> Vec<Status> {
        self.statuses.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Notices seen so far, oldest first
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().map(|n| n.clone()).unwrap_or_default()
    }
}

impl StatusSink for RecordedStatus {
    fn status(&self, status: Status) {
        if let Ok(mut statuses) = self.statuses.lock() {
            statuses.push(status);
        }
    }

    fn notice(&self, notice: Notice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}
