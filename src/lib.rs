//! JARVIS - Voice assistant front end
//!
//! This library provides the pieces of the assistant:
//! - Utterance routing to local command handlers
//! - Conversation with a remote chat-completion model, with canned fallbacks
//! - Speech input and output (Whisper STT, OpenAI TTS, or plain text)
//! - Credential persistence and the session log
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐     ┌──────────────────┐
//! │ TranscriptSource │ ──▶ │ UtteranceRouter  │ ──▶ │ open / volume /  │
//! │ (mic or stdin)   │     │                  │     │ calculate        │
//! └──────────────────┘     └────────┬─────────┘     └────────┬─────────┘
//!                                   │ otherwise              │
//!                          ┌────────▼─────────┐              │
//!                          │ Conversational   │              │
//!                          │ Session          │              │
//!                          └────────┬─────────┘              │
//!                                   │ reply                  │
//!                          ┌────────▼─────────┐              │
//!                          │ SpeechSink       │ ◀────────────┘
//!                          │ + SessionLog     │
//!                          └──────────────────┘
//! ```

pub mod assistant;
pub mod commands;
pub mod config;
pub mod conversation;
pub mod credentials;
pub mod db;
pub mod error;
pub mod router;
pub mod session_log;
pub mod status;
pub mod voice;

pub use assistant::{Assistant, TurnOutcome};
pub use config::Config;
pub use conversation::{ChatClient, ConversationalSession};
pub use credentials::{CredentialStore, MemoryCredentialStore, SqliteCredentialStore};
pub use db::{DbConn, DbPool};
pub use error::{Error, Result};
pub use router::{Route, UtteranceRouter};
pub use session_log::{SessionLog, Speaker};
pub use status::{Notice, Status, StatusSink};
