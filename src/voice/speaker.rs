//! Spoken replies through the speech endpoint and the default speakers

use std::sync::Arc;

use async_trait::async_trait;

use super::playback::AudioPlayback;
use super::tts::{TextToSpeech, catalog};
use super::{SpeechSink, Voice};
use crate::config::VoiceConfig;
use crate::credentials::CredentialStore;
use crate::{Error, Result};

/// Voice used when the caller does not pick one
const FALLBACK_VOICE: &str = "alloy";

/// Synthesizes replies and plays them to completion
pub struct SpokenSink {
    tts: TextToSpeech,
    credentials: Arc<dyn CredentialStore>,
    preferred: Option<String>,
}

impl SpokenSink {
    #[must_use]
    pub fn new(config: &VoiceConfig, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            tts: TextToSpeech::new(config),
            credentials,
            preferred: config.tts_voice.clone(),
        }
    }
}

#[async_trait(?Send)]
impl SpeechSink for SpokenSink {
    /// The catalog, with the configured voice listed first
    fn voices(&self) -> Vec<Voice> {
        let mut voices = catalog();
        if let Some(name) = &self.preferred {
            let preferred = voices
                .iter()
                .position(|v| &v.name == name)
                .map_or_else(|| Voice::new(name.clone(), "en-US"), |i| voices.remove(i));
            voices.insert(0, preferred);
        }
        voices
    }

    async fn speak(&mut self, text: &str, voice: Option<&Voice>) -> Result<()> {
        let credential = self
            .credentials
            .get()?
            .ok_or_else(|| Error::Credential("speech output needs an API key".to_string()))?;

        let name = voice.map_or(FALLBACK_VOICE, |v| v.name.as_str());
        let audio = self.tts.synthesize(&credential, text, name).await?;

        let playback = AudioPlayback::new()?;
        playback.play_mp3(&audio).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::MemoryCredentialStore;
    use crate::voice::select_voice;

    fn sink(preferred: Option<&str>) -> SpokenSink {
        let config = VoiceConfig {
            tts_voice: preferred.map(str::to_string),
            ..VoiceConfig::default()
        };
        SpokenSink::new(&config, Arc::new(MemoryCredentialStore::new()))
    }

    #[test]
    fn configured_voice_is_selected() {
        let voices = sink(Some("fable")).voices();
        assert_eq!(voices.len(), 6);
        assert_eq!(select_voice(&voices).unwrap().name, "fable");
    }

    #[test]
    fn unknown_configured_voice_is_added() {
        let voices = sink(Some("custom")).voices();
        assert_eq!(voices.len(), 7);
        assert_eq!(voices[0].name, "custom");
    }

    #[tokio::test]
    async fn speaking_without_credential_fails() {
        let mut sink = sink(None);
        let err = sink.speak("hello", None).await.unwrap_err();
        assert!(matches!(err, Error::Credential(_)));
    }
}
