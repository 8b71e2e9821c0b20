//! Chat completion client

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::history::{ConversationHistory, Turn};
use crate::config::ChatConfig;

/// Failure of a single chat completion request
#[derive(Debug, Error)]
pub enum ChatError {
    /// Service answered with a non-success status
    #[error("{message}")]
    Api {
        status: reqwest::StatusCode,
        message: String,
    },

    /// Request never completed (connect, timeout, transport)
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Success status but no usable reply
    #[error("No response from ChatGPT")]
    EmptyResponse,

    /// Success status but the body did not parse
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// How a failure is reported to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Credential rejected; it must be erased
    CredentialInvalid,
    /// Service unreachable
    Network,
    /// Anything else
    Other,
}

impl ChatError {
    /// Classify the failure
    ///
    /// A 401, or a service message mentioning a key, counts as a bad
    /// credential. Only the service's own message is inspected.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Api { status, message } => {
                let message = message.to_lowercase();
                if *status == reqwest::StatusCode::UNAUTHORIZED || message.contains("key") {
                    FailureKind::CredentialInvalid
                } else if message.contains("network") {
                    FailureKind::Network
                } else {
                    FailureKind::Other
                }
            }
            Self::Network(_) => FailureKind::Network,
            Self::EmptyResponse | Self::Malformed(_) => FailureKind::Other,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<&'a Turn>,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Generic message when the error body carries none
const REQUEST_FAILED: &str = "API request failed";

/// Sends one conversation to an OpenAI-compatible chat endpoint
pub struct ChatClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    max_tokens: u32,
    persona: Turn,
}

impl ChatClient {
    /// Create a client from chat configuration
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(config: &ChatConfig) -> crate::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            persona: Turn::system(&config.system_prompt),
        })
    }

    /// Request a reply to `prompt` given the prior `history`
    ///
    /// The history is not modified; the caller records the exchange.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError`] for transport failures, non-success statuses and
    /// responses without a first choice.
    pub async fn complete(
        &self,
        credential: &SecretString,
        history: &ConversationHistory,
        prompt: &str,
    ) -> Result<String, ChatError> {
        let user = Turn::user(prompt);
        let messages: Vec<&Turn> = std::iter::once(&self.persona)
            .chain(history.iter())
            .chain(std::iter::once(&user))
            .collect();

        let request = ChatRequest {
            model: &self.model,
            messages,
            max_tokens: self.max_tokens,
        };

        tracing::debug!(
            model = %self.model,
            history = history.len(),
            "sending chat completion"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(credential.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "chat request failed");
                ChatError::Network(e)
            })?;

        let status = response.status();
        tracing::debug!(status = %status, "received response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .and_then(|e| e.error)
                .and_then(|e| e.message)
                .unwrap_or_else(|| REQUEST_FAILED.to_string());
            tracing::error!(status = %status, message = %message, "chat API error");
            return Err(ChatError::Api { status, message });
        }

        let body = response.text().await.map_err(ChatError::Network)?;
        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| ChatError::Malformed(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(ChatError::EmptyResponse)
    }
}
