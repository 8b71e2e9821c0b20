//! Speech input and output
//!
//! [`TranscriptSource`] yields one transcript per listening session and
//! [`SpeechSink`] speaks a reply, resolving when playback has finished.
//! Voice mode backs them with the microphone + Whisper and TTS + speakers;
//! text mode uses the terminal.

mod capture;
mod console;
mod microphone;
mod playback;
mod speaker;
mod stt;
mod tts;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use thiserror::Error;

pub use capture::{AudioCapture, SAMPLE_RATE, rms_energy, samples_to_wav};
pub use console::{ConsoleSource, TextOnlySink};
pub use microphone::{DetectorEvent, MicrophoneSource, UtteranceDetector};
pub use playback::AudioPlayback;
pub use speaker::SpokenSink;
pub use stt::SpeechToText;
pub use tts::{OPENAI_VOICES, TextToSpeech};

use crate::Result;

/// Why a listening session produced no transcript
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecognitionError {
    /// Microphone access was refused (`not-allowed`)
    #[error("not-allowed")]
    PermissionDenied,

    /// Nothing was said before the timeout (`no-speech`)
    #[error("no-speech")]
    NoSpeech,

    /// No input device (`audio-capture`)
    #[error("audio-capture")]
    NoMicrophone,

    /// Transcription service unreachable (`network`)
    #[error("network")]
    Network,

    /// Listening was stopped before anything was said (`aborted`)
    #[error("aborted")]
    Aborted,

    /// Transcription service refused to serve us (`service-not-allowed`)
    #[error("service-not-allowed")]
    ServiceNotAllowed,

    /// Input stream ended; no further sessions are possible
    #[error("input-closed")]
    InputClosed,

    /// Any other recognizer error code
    #[error("{0}")]
    Other(String),
}

impl RecognitionError {
    /// Map a recognizer error code to its variant
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "not-allowed" => Self::PermissionDenied,
            "no-speech" => Self::NoSpeech,
            "audio-capture" => Self::NoMicrophone,
            "network" => Self::Network,
            "aborted" => Self::Aborted,
            "service-not-allowed" => Self::ServiceNotAllowed,
            "input-closed" => Self::InputClosed,
            other => Self::Other(other.to_string()),
        }
    }

    /// Text shown to the user for this error
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::PermissionDenied => "Microphone access was denied. Please allow microphone access in your settings and try again.".to_string(),
            Self::NoSpeech => "No speech was detected. Please try again.".to_string(),
            Self::NoMicrophone => "No microphone was found. Please ensure your microphone is connected and try again.".to_string(),
            Self::Network => "Network error occurred. Please check your internet connection.".to_string(),
            Self::Aborted => "Listening stopped.".to_string(),
            Self::ServiceNotAllowed => "Speech recognition is unavailable. Run `jarvis set-key` to enable voice input.".to_string(),
            Self::InputClosed => "Input closed.".to_string(),
            Self::Other(code) => format!("Error occurred in recognition: {code}"),
        }
    }
}

/// Ends an in-progress listening session from another task
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the current session to finish
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether a stop was requested
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clear a pending stop before a new session starts
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Produces one finalized transcript per listening session
///
/// Audio streams are tied to the thread that opened them, so sources and
/// sinks are driven from the owning task rather than spawned.
#[async_trait(?Send)]
pub trait TranscriptSource {
    /// Run one listening session
    ///
    /// # Errors
    ///
    /// Returns the recognizer's error code when no transcript was produced
    async fn listen(&mut self) -> std::result::Result<String, RecognitionError>;

    /// Handle that ends the current session early
    fn stop_handle(&self) -> StopHandle;
}

/// An installed synthesis voice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    /// BCP 47 tag such as "en-US"
    pub lang: String,
}

impl Voice {
    #[must_use]
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
        }
    }
}

/// Pick the first English voice, else the first voice at all
#[must_use]
pub fn select_voice(voices: &[Voice]) -> Option<Voice> {
    voices
        .iter()
        .find(|v| v.lang.contains("en-"))
        .or_else(|| voices.first())
        .cloned()
}

/// Speaks replies aloud
#[async_trait(?Send)]
pub trait SpeechSink {
    /// Voices this sink can speak with
    fn voices(&self) -> Vec<Voice>;

    /// Speak `text`, returning once playback has completed
    ///
    /// # Errors
    ///
    /// Returns error if synthesis or playback fails
    async fn speak(&mut self, text: &str, voice: Option<&Voice>) -> Result<()>;
}
