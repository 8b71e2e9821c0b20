//! Conversational session: history, credential, remote call, fallback

use std::sync::Arc;

use secrecy::SecretString;

use super::client::{ChatClient, ChatError, FailureKind};
use super::fallback::default_reply;
use super::history::ConversationHistory;
use crate::credentials::CredentialStore;
use crate::status::{Notice, Status, StatusSink};
use crate::Result;

/// Owns the conversation history and the credential for one process
pub struct ConversationalSession {
    client: ChatClient,
    store: Arc<dyn CredentialStore>,
    credential: Option<SecretString>,
    history: ConversationHistory,
    status: Arc<dyn StatusSink>,
}

impl ConversationalSession {
    /// Create a session, loading any stored credential
    ///
    /// # Errors
    ///
    /// Returns error if the credential store cannot be read
    pub fn new(
        client: ChatClient,
        store: Arc<dyn CredentialStore>,
        status: Arc<dyn StatusSink>,
        history_limit: usize,
    ) -> Result<Self> {
        let credential = store.get()?;
        tracing::debug!(has_credential = credential.is_some(), "conversational session ready");

        Ok(Self {
            client,
            store,
            credential,
            history: ConversationHistory::new(history_limit),
            status,
        })
    }

    #[must_use]
    pub const fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    #[must_use]
    pub const fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// Store a new credential
    ///
    /// Surrounding whitespace is stripped before the key is stored, since a
    /// pasted key with a trailing newline is never valid as a bearer token.
    /// Blank input is rejected with a notice and leaves the current credential
    /// untouched. Returns whether the credential was stored.
    ///
    /// # Errors
    ///
    /// Returns error if the credential store cannot be written
    pub fn set_credential(&mut self, key: &str) -> Result<bool> {
        let key = key.trim();
        if key.is_empty() {
            self.status.notice(Notice::CredentialBlank);
            return Ok(false);
        }

        let secret = SecretString::from(key.to_string());
        self.store.set(&secret)?;
        self.credential = Some(secret);
        self.status.notice(Notice::CredentialSaved);
        Ok(true)
    }

    /// Forget the credential in memory and in the store
    ///
    /// # Errors
    ///
    /// Returns error if the credential store cannot be written
    pub fn clear_credential(&mut self) -> Result<()> {
        self.credential = None;
        self.store.remove()
    }

    /// Produce a reply to `prompt`
    ///
    /// Never fails: without a credential, or when the remote call fails, the
    /// canned default reply is returned instead.
    pub async fn respond(&mut self, prompt: &str) -> String {
        let Some(credential) = self.credential.clone() else {
            self.status.notice(Notice::CredentialRequired);
            return default_reply(prompt);
        };

        self.status.status(Status::Connecting);

        match self.client.complete(&credential, &self.history, prompt).await {
            Ok(reply) => {
                self.history.push_exchange(prompt, &reply);
                self.status.status(Status::Ready);
                tracing::debug!(
                    history = self.history.len(),
                    reply_len = reply.len(),
                    "chat model replied"
                );
                reply
            }
            Err(e) => {
                self.handle_failure(&e);
                default_reply(prompt)
            }
        }
    }

    fn handle_failure(&mut self, error: &ChatError) {
        tracing::error!(error = %error, "chat completion failed");

        let notice = match error.kind() {
            FailureKind::CredentialInvalid => {
                if let Err(e) = self.clear_credential() {
                    tracing::warn!(error = %e, "failed to erase rejected credential");
                }
                Notice::CredentialInvalid
            }
            FailureKind::Network => Notice::NetworkError,
            FailureKind::Other => Notice::ServiceError,
        };

        self.status.notice(notice);
    }
}
