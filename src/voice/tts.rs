//! Text-to-speech (TTS) via an OpenAI-compatible speech endpoint

use secrecy::{ExposeSecret, SecretString};

use super::Voice;
use crate::config::VoiceConfig;
use crate::{Error, Result};

/// Voices offered by the speech endpoint, with the accent each one speaks
pub const OPENAI_VOICES: &[(&str, &str)] = &[
    ("alloy", "en-US"),
    ("echo", "en-US"),
    ("fable", "en-GB"),
    ("onyx", "en-US"),
    ("nova", "en-US"),
    ("shimmer", "en-US"),
];

/// The voice catalog as [`Voice`] values
#[must_use]
pub fn catalog() -> Vec<Voice> {
    OPENAI_VOICES
        .iter()
        .map(|(name, lang)| Voice::new(*name, *lang))
        .collect()
}

#[derive(serde::Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    speed: f64,
}

/// Synthesizes speech from text
pub struct TextToSpeech {
    client: reqwest::Client,
    url: String,
    model: String,
    speed: f64,
}

impl TextToSpeech {
    /// Create a synthesizer from voice configuration
    #[must_use]
    pub fn new(config: &VoiceConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: config.tts_url.clone(),
            model: config.tts_model.clone(),
            speed: config.tts_speed,
        }
    }

    /// Synthesize `text` with the named voice
    ///
    /// # Returns
    ///
    /// Audio bytes (MP3 format)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the request cannot be sent and [`Error::Tts`]
    /// if the service answers with an error status
    pub async fn synthesize(
        &self,
        credential: &SecretString,
        text: &str,
        voice: &str,
    ) -> Result<Vec<u8>> {
        let request = SpeechRequest {
            model: &self.model,
            input: text,
            voice,
            speed: self.speed,
        };

        tracing::debug!(voice, chars = text.len(), "synthesizing speech");

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(credential.expose_secret())
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Tts(format!("TTS error {status}: {body}")));
        }

        let audio = response.bytes().await?;
        Ok(audio.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voice::select_voice;

    #[test]
    fn catalog_default_is_american() {
        let voices = catalog();
        assert_eq!(voices.len(), OPENAI_VOICES.len());
        assert_eq!(select_voice(&voices).unwrap().name, "alloy");
    }
}
