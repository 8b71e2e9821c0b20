//! Configuration management for the assistant

pub mod file;

use std::path::PathBuf;
use std::time::Duration;

use crate::Result;
use file::JarvisConfigFile;

/// Default chat completion endpoint
pub const DEFAULT_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Default transcription endpoint
pub const DEFAULT_STT_URL: &str = "https://api.openai.com/v1/audio/transcriptions";

/// Default speech endpoint
pub const DEFAULT_TTS_URL: &str = "https://api.openai.com/v1/audio/speech";

/// Persona instruction sent ahead of every conversation
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are JARVIS, a helpful and knowledgeable AI assistant. Respond in a concise and natural way.";

/// Assistant configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to data directory (credential database)
    pub data_dir: PathBuf,

    /// Chat completion configuration
    pub chat: ChatConfig,

    /// Voice configuration
    pub voice: VoiceConfig,

    /// Extra (name, url) pairs for the "open" command, in file order
    pub apps: Vec<(String, String)>,
}

/// Remote conversational service configuration
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Chat completion endpoint
    pub endpoint: String,

    /// Model identifier
    pub model: String,

    /// Reply length cap
    pub max_tokens: u32,

    /// System persona message
    pub system_prompt: String,

    /// History entries kept between turns
    pub history_limit: usize,

    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_CHAT_URL.to_string(),
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 150,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            history_limit: crate::conversation::DEFAULT_HISTORY_LIMIT,
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// Voice processing configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Recognition language hint (e.g. "en-US")
    pub language: String,

    /// Transcription endpoint
    pub stt_url: String,

    /// STT model (e.g. "whisper-1")
    pub stt_model: String,

    /// Speech endpoint
    pub tts_url: String,

    /// TTS model (e.g. "tts-1")
    pub tts_model: String,

    /// Preferred TTS voice; `None` picks the first English voice
    pub tts_voice: Option<String>,

    /// TTS speed multiplier (0.25 to 4.0)
    pub tts_speed: f64,

    /// Longest single listening session
    pub max_listen: Duration,

    /// Give up when nothing is said for this long
    pub no_speech_timeout: Duration,

    /// Trailing silence that ends an utterance
    pub end_silence: Duration,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            stt_url: DEFAULT_STT_URL.to_string(),
            stt_model: "whisper-1".to_string(),
            tts_url: DEFAULT_TTS_URL.to_string(),
            tts_model: "tts-1".to_string(),
            tts_voice: None,
            tts_speed: 1.0,
            max_listen: Duration::from_secs(10),
            no_speech_timeout: Duration::from_secs(5),
            end_silence: Duration::from_millis(800),
        }
    }
}

impl Config {
    /// Load configuration (env > toml > default)
    ///
    /// # Errors
    ///
    /// Returns error if the data directory cannot be created
    pub fn load() -> Result<Self> {
        let fc = file::load_config_file();
        let config = Self::from_sources(fc, |key| std::env::var(key).ok());

        std::fs::create_dir_all(&config.data_dir)?;

        Ok(config)
    }

    /// Build configuration from a parsed file and an environment lookup
    #[must_use]
    pub fn from_sources(fc: JarvisConfigFile, env: impl Fn(&str) -> Option<String>) -> Self {
        let chat_defaults = ChatConfig::default();
        let chat = ChatConfig {
            endpoint: env("JARVIS_CHAT_URL")
                .or(fc.chat.endpoint)
                .unwrap_or(chat_defaults.endpoint),
            model: env("JARVIS_MODEL")
                .or(fc.chat.model)
                .unwrap_or(chat_defaults.model),
            max_tokens: env("JARVIS_MAX_TOKENS")
                .and_then(|s| s.parse().ok())
                .or(fc.chat.max_tokens)
                .unwrap_or(chat_defaults.max_tokens),
            system_prompt: fc
                .chat
                .system_prompt
                .unwrap_or(chat_defaults.system_prompt),
            history_limit: clamp_history_limit(
                env("JARVIS_HISTORY_LIMIT")
                    .and_then(|s| s.parse().ok())
                    .or(fc.chat.history_limit)
                    .unwrap_or(chat_defaults.history_limit),
            ),
            request_timeout: env("JARVIS_REQUEST_TIMEOUT")
                .and_then(|s| s.parse().ok())
                .or(fc.chat.request_timeout_secs)
                .map_or(chat_defaults.request_timeout, Duration::from_secs),
        };

        let voice_defaults = VoiceConfig::default();
        let voice = VoiceConfig {
            language: env("JARVIS_LANGUAGE")
                .or(fc.voice.language)
                .unwrap_or(voice_defaults.language),
            stt_url: env("JARVIS_STT_URL")
                .or(fc.voice.stt_url)
                .unwrap_or(voice_defaults.stt_url),
            stt_model: env("JARVIS_STT_MODEL")
                .or(fc.voice.stt_model)
                .unwrap_or(voice_defaults.stt_model),
            tts_url: env("JARVIS_TTS_URL")
                .or(fc.voice.tts_url)
                .unwrap_or(voice_defaults.tts_url),
            tts_model: env("JARVIS_TTS_MODEL")
                .or(fc.voice.tts_model)
                .unwrap_or(voice_defaults.tts_model),
            tts_voice: env("JARVIS_TTS_VOICE").or(fc.voice.tts_voice),
            tts_speed: fc
                .voice
                .tts_speed
                .unwrap_or(voice_defaults.tts_speed)
                .clamp(0.25, 4.0),
            max_listen: fc
                .voice
                .max_listen_secs
                .map_or(voice_defaults.max_listen, Duration::from_secs),
            no_speech_timeout: fc
                .voice
                .no_speech_secs
                .map_or(voice_defaults.no_speech_timeout, Duration::from_secs),
            end_silence: fc
                .voice
                .end_silence_ms
                .map_or(voice_defaults.end_silence, Duration::from_millis),
        };

        // Determine data directory (~/.local/share/jarvis on Linux)
        let data_dir = env("JARVIS_DATA_DIR")
            .or(fc.server.data_dir)
            .map_or_else(default_data_dir, PathBuf::from);

        let apps = fc.apps.into_iter().map(|a| (a.name, a.url)).collect();

        Self {
            data_dir,
            chat,
            voice,
            apps,
        }
    }

    /// Path of the credential database
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("jarvis.db")
    }
}

fn clamp_history_limit(limit: usize) -> usize {
    let max = crate::conversation::MAX_HISTORY_LIMIT;
    if limit > max {
        tracing::warn!(requested = limit, max, "history limit too large, clamping");
        return max;
    }
    limit
}

fn default_data_dir() -> PathBuf {
    directories::BaseDirs::new().map_or_else(|| PathBuf::from("."), |d| d.data_dir().join("jarvis"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_sources() {
        let config = Config::from_sources(JarvisConfigFile::default(), |_| None);
        assert_eq!(config.chat.endpoint, DEFAULT_CHAT_URL);
        assert_eq!(config.chat.model, "gpt-3.5-turbo");
        assert_eq!(config.chat.max_tokens, 150);
        assert_eq!(config.chat.history_limit, 10);
        assert_eq!(config.voice.stt_model, "whisper-1");
        assert!(config.voice.tts_voice.is_none());
        assert!(config.apps.is_empty());
    }

    #[test]
    fn env_overrides_file() {
        let fc = file::parse_config(
            r#"
            [chat]
            model = "from-file"
            max_tokens = 99
            "#,
        )
        .unwrap();
        let config = Config::from_sources(fc, env_from(&[("JARVIS_MODEL", "from-env")]));

        assert_eq!(config.chat.model, "from-env");
        assert_eq!(config.chat.max_tokens, 99);
    }

    #[test]
    fn unparsable_env_number_falls_back() {
        let config = Config::from_sources(
            JarvisConfigFile::default(),
            env_from(&[("JARVIS_MAX_TOKENS", "lots")]),
        );
        assert_eq!(config.chat.max_tokens, 150);
    }

    #[test]
    fn oversized_history_limit_is_clamped() {
        let config = Config::from_sources(
            JarvisConfigFile::default(),
            env_from(&[("JARVIS_HISTORY_LIMIT", "100000000000000")]),
        );
        assert_eq!(
            config.chat.history_limit,
            crate::conversation::MAX_HISTORY_LIMIT
        );

        let fc = file::parse_config("[chat]\nhistory_limit = 4").unwrap();
        assert_eq!(Config::from_sources(fc, |_| None).chat.history_limit, 4);
    }

    #[test]
    fn data_dir_from_env() {
        let config = Config::from_sources(
            JarvisConfigFile::default(),
            env_from(&[("JARVIS_DATA_DIR", "/tmp/jarvis-test")]),
        );
        assert_eq!(config.db_path(), PathBuf::from("/tmp/jarvis-test/jarvis.db"));
    }

    #[test]
    fn apps_keep_file_order() {
        let fc = file::parse_config(
            r#"
            [[apps]]
            name = "github"
            url = "https://github.com"

            [[apps]]
            name = "wiki"
            url = "https://wikipedia.org"
            "#,
        )
        .unwrap();
        let config = Config::from_sources(fc, |_| None);
        assert_eq!(config.apps[0].0, "github");
        assert_eq!(config.apps[1].0, "wiki");
    }
}
