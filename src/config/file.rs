//! TOML configuration file loading
//!
//! Supports `~/.config/jarvis/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct JarvisConfigFile {
    /// Chat completion configuration
    #[serde(default)]
    pub chat: ChatFileConfig,

    /// Voice/audio configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// Extra applications for the "open" command
    #[serde(default)]
    pub apps: Vec<AppFileEntry>,

    /// Storage configuration
    #[serde(default)]
    pub server: ServerFileConfig,
}

/// Chat completion configuration
#[derive(Debug, Default, Deserialize)]
pub struct ChatFileConfig {
    /// Chat completion endpoint URL
    pub endpoint: Option<String>,

    /// Model identifier (e.g. "gpt-3.5-turbo")
    pub model: Option<String>,

    /// Reply length cap
    pub max_tokens: Option<u32>,

    /// Persona instruction sent as the system message
    pub system_prompt: Option<String>,

    /// Number of history entries kept between turns
    pub history_limit: Option<usize>,

    /// Request timeout in seconds
    pub request_timeout_secs: Option<u64>,
}

/// Voice processing configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// Recognition language (e.g. "en-US")
    pub language: Option<String>,

    /// Transcription endpoint URL
    pub stt_url: Option<String>,

    /// STT model (e.g. "whisper-1")
    pub stt_model: Option<String>,

    /// Speech endpoint URL
    pub tts_url: Option<String>,

    /// TTS model (e.g. "tts-1")
    pub tts_model: Option<String>,

    /// TTS voice identifier (e.g. "alloy")
    pub tts_voice: Option<String>,

    /// TTS speed multiplier
    pub tts_speed: Option<f64>,

    /// Longest single listening session in seconds
    pub max_listen_secs: Option<u64>,

    /// Give up when nothing is said for this many seconds
    pub no_speech_secs: Option<u64>,

    /// Trailing silence that ends an utterance, in milliseconds
    pub end_silence_ms: Option<u64>,
}

/// One application entry: `{ name = "github", url = "https://github.com" }`
#[derive(Debug, Clone, Deserialize)]
pub struct AppFileEntry {
    pub name: String,
    pub url: String,
}

/// Storage configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// Data directory holding the credential database
    pub data_dir: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `JarvisConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> JarvisConfigFile {
    let Some(path) = config_file_path() else {
        return JarvisConfigFile::default();
    };

    if !path.exists() {
        return JarvisConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => parse_config(&content).unwrap_or_else(|e| {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to parse config file, using defaults"
            );
            JarvisConfigFile::default()
        }),
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            JarvisConfigFile::default()
        }
    }
}

/// Parse config file contents
///
/// # Errors
///
/// Returns error if the TOML is malformed
pub fn parse_config(content: &str) -> crate::Result<JarvisConfigFile> {
    Ok(toml::from_str(content)?)
}

/// Return the config file path: `~/.config/jarvis/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("jarvis").join("config.toml"))
}
