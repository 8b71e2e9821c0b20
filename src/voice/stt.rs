//! Speech-to-text (STT) via an OpenAI-compatible transcription endpoint

use secrecy::{ExposeSecret, SecretString};

use crate::config::VoiceConfig;
use crate::{Error, Result};

/// Response from the Whisper transcription API
#[derive(serde::Deserialize)]
struct WhisperResponse {
    text: String,
}

/// Transcribes recorded speech to text
pub struct SpeechToText {
    client: reqwest::Client,
    url: String,
    model: String,
    language: String,
}

impl SpeechToText {
    /// Create a transcriber from voice configuration
    #[must_use]
    pub fn new(config: &VoiceConfig) -> Self {
        // Whisper takes ISO-639-1 ("en"), not the full locale
        let language = config
            .language
            .split(['-', '_'])
            .next()
            .unwrap_or("en")
            .to_lowercase();

        Self {
            client: reqwest::Client::new(),
            url: config.stt_url.clone(),
            model: config.stt_model.clone(),
            language,
        }
    }

    /// Transcribe WAV audio to text
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the request cannot be sent and
    /// [`Error::SttRejected`] if the service answers with an error status
    pub async fn transcribe(&self, credential: &SecretString, wav: Vec<u8>) -> Result<String> {
        tracing::debug!(audio_bytes = wav.len(), "starting Whisper transcription");

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(wav)
                    .file_name("audio.wav")
                    .mime_str("audio/wav")
                    .map_err(|e| Error::Stt(e.to_string()))?,
            )
            .text("model", self.model.clone())
            .text("language", self.language.clone());

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(credential.expose_secret())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Whisper request failed");
                e
            })?;

        let status = response.status();
        tracing::debug!(status = %status, "received response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Whisper API error");
            return Err(Error::SttRejected { status, body });
        }

        let result: WhisperResponse = response.json().await?;

        tracing::info!(transcript = %result.text, "transcription complete");
        Ok(result.text)
    }
}
