//! Shared test utilities

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use url::Url;

use jarvis_voice::commands::{OpenAppHandler, UrlOpener};
use jarvis_voice::config::ChatConfig;
use jarvis_voice::status::RecordedStatus;
use jarvis_voice::voice::{RecognitionError, SpeechSink, StopHandle, TranscriptSource, Voice};
use jarvis_voice::{
    Assistant, ChatClient, ConversationalSession, CredentialStore, MemoryCredentialStore,
};

/// Test credential value
pub const TEST_KEY: &str = "sk-test-123";

/// Path the mock chat endpoint is mounted on
pub const CHAT_PATH: &str = "/v1/chat/completions";

/// Remembers every URL it was asked to open
#[derive(Default)]
pub struct RecordingOpener {
    opened: Mutex<Vec<Url>>,
}

impl RecordingOpener {
    pub fn opened(&self) -> Vec<String> {
        self.opened
            .lock()
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect()
    }
}

impl UrlOpener for RecordingOpener {
    fn open(&self, url: &Url) -> jarvis_voice::Result<()> {
        self.opened.lock().unwrap().push(url.clone());
        Ok(())
    }
}

/// Plays back a fixed list of recognition results, then reports closed input
#[derive(Default)]
pub struct ScriptedSource {
    script: VecDeque<Result<String, RecognitionError>>,
    stop: StopHandle,
}

impl ScriptedSource {
    pub fn new(script: impl IntoIterator<Item = Result<String, RecognitionError>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            stop: StopHandle::new(),
        }
    }

    pub fn saying(transcripts: &[&str]) -> Self {
        Self::new(transcripts.iter().map(|t| Ok((*t).to_string())))
    }
}

#[async_trait(?Send)]
impl TranscriptSource for ScriptedSource {
    async fn listen(&mut self) -> Result<String, RecognitionError> {
        self.script
            .pop_front()
            .unwrap_or(Err(RecognitionError::InputClosed))
    }

    fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }
}

/// Records what it was asked to say and with which voice
#[derive(Clone, Default)]
pub struct RecordingSink {
    spoken: Arc<Mutex<Vec<(String, Option<String>)>>>,
    voices: Vec<Voice>,
    fail: bool,
}

impl RecordingSink {
    pub fn with_voices(voices: Vec<Voice>) -> Self {
        Self {
            voices,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Replies spoken so far
    pub fn spoken(&self) -> Vec<String> {
        self.spoken
            .lock()
            .unwrap()
            .iter()
            .map(|(text, _)| text.clone())
            .collect()
    }

    /// Voice names used so far
    pub fn voices_used(&self) -> Vec<Option<String>> {
        self.spoken
            .lock()
            .unwrap()
            .iter()
            .map(|(_, voice)| voice.clone())
            .collect()
    }
}

#[async_trait(?Send)]
impl SpeechSink for RecordingSink {
    fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    async fn speak(&mut self, text: &str, voice: Option<&Voice>) -> jarvis_voice::Result<()> {
        if self.fail {
            return Err(jarvis_voice::Error::Tts("synthesizer offline".to_string()));
        }
        self.spoken
            .lock()
            .unwrap()
            .push((text.to_string(), voice.map(|v| v.name.clone())));
        Ok(())
    }
}

/// Chat configuration pointed at a mock server
pub fn chat_config(server_uri: &str) -> ChatConfig {
    ChatConfig {
        endpoint: format!("{server_uri}{CHAT_PATH}"),
        ..ChatConfig::default()
    }
}

/// A credential store holding [`TEST_KEY`]
pub fn keyed_store() -> Arc<MemoryCredentialStore> {
    Arc::new(MemoryCredentialStore::with_credential(TEST_KEY))
}

/// Conversational session against a mock server
pub fn session(
    server_uri: &str,
    store: Arc<dyn CredentialStore>,
    status: Arc<RecordedStatus>,
) -> ConversationalSession {
    let config = chat_config(server_uri);
    let client = ChatClient::new(&config).unwrap();
    ConversationalSession::new(client, store, status, config.history_limit).unwrap()
}

/// Everything an assistant test needs to inspect afterwards
pub struct Harness {
    pub assistant: Assistant,
    pub opener: Arc<RecordingOpener>,
    pub sink: RecordingSink,
    pub status: Arc<RecordedStatus>,
}

/// Assistant with scripted input, recorded output and a mock chat server
pub fn harness(
    server_uri: &str,
    store: Arc<dyn CredentialStore>,
    source: ScriptedSource,
    sink: RecordingSink,
) -> Harness {
    let status = Arc::new(RecordedStatus::new());
    let opener = Arc::new(RecordingOpener::default());
    let conversation = session(server_uri, store, Arc::clone(&status));
    let open_app = OpenAppHandler::new(Arc::clone(&opener) as Arc<dyn UrlOpener>);

    let assistant = Assistant::new(
        conversation,
        open_app,
        Box::new(source),
        Box::new(sink.clone()),
        Arc::clone(&status) as Arc<dyn jarvis_voice::StatusSink>,
    );

    Harness {
        assistant,
        opener,
        sink,
        status,
    }
}

/// A successful chat completion body
pub fn chat_reply(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "model": "gpt-3.5-turbo",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

/// An error body as the chat service sends it
pub fn chat_error(message: &str) -> serde_json::Value {
    serde_json::json!({
        "error": {"message": message, "type": "invalid_request_error"}
    })
}
