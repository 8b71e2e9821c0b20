//! Conversation with the remote chat model
//!
//! The session keeps a short rolling history and one credential, calls the
//! chat endpoint once per turn and falls back to canned replies whenever the
//! model is unavailable.

mod client;
pub mod fallback;
mod history;
mod session;

pub use client::{ChatClient, ChatError, FailureKind};
pub use fallback::{default_reply, default_reply_at};
pub use history::{ConversationHistory, DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT, Role, Turn};
pub use session::ConversationalSession;
