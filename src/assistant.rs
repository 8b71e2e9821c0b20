//! The assistant: one owner for the whole listen, route, reply, speak turn
//!
//! Every turn runs strictly in sequence. Recognition finishes before routing
//! starts, and the reply is spoken before the next listening session may begin.
//! All session state (listening flag, history, credential) lives here and is
//! only touched through `&mut self`.

use std::sync::Arc;

use crate::commands::{CalculationHandler, OpenAppHandler, VolumeHandler};
use crate::conversation::ConversationalSession;
use crate::router::{Route, UtteranceRouter};
use crate::session_log::{SessionLog, Speaker};
use crate::status::{Notice, Status, StatusSink};
use crate::voice::{
    RecognitionError, SpeechSink, StopHandle, TranscriptSource, Voice, select_voice,
};
use crate::Result;

/// How a turn ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// A reply was produced and handed to the speech sink
    Spoken(String),
    /// Recognition failed; nothing was said
    Aborted(RecognitionError),
    /// The transcript source has no more input
    Closed,
}

/// Clears the listening flag when a recognition session ends, however it ends
struct ListeningGuard<'a>(&'a mut bool);

impl<'a> ListeningGuard<'a> {
    fn new(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for ListeningGuard<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

/// Voice assistant session
pub struct Assistant {
    router: UtteranceRouter,
    open_app: OpenAppHandler,
    volume: VolumeHandler,
    calculate: CalculationHandler,
    conversation: ConversationalSession,
    log: SessionLog,
    status: Arc<dyn StatusSink>,
    source: Box<dyn TranscriptSource>,
    sink: Box<dyn SpeechSink>,
    voice: Option<Voice>,
    listening: bool,
}

impl Assistant {
    /// Assemble an assistant, choosing the output voice once
    #[must_use]
    pub fn new(
        conversation: ConversationalSession,
        open_app: OpenAppHandler,
        source: Box<dyn TranscriptSource>,
        sink: Box<dyn SpeechSink>,
        status: Arc<dyn StatusSink>,
    ) -> Self {
        let voice = select_voice(&sink.voices());
        tracing::debug!(voice = ?voice.as_ref().map(|v| &v.name), "speech voice selected");

        Self {
            router: UtteranceRouter::new(),
            open_app,
            volume: VolumeHandler,
            calculate: CalculationHandler,
            conversation,
            log: SessionLog::new(),
            status,
            source,
            sink,
            voice,
            listening: false,
        }
    }

    /// Replace the session log, e.g. with one that prints as it goes
    #[must_use]
    pub fn with_log(mut self, log: SessionLog) -> Self {
        self.log = log;
        self
    }

    #[must_use]
    pub const fn log(&self) -> &SessionLog {
        &self.log
    }

    #[must_use]
    pub const fn conversation(&self) -> &ConversationalSession {
        &self.conversation
    }

    #[must_use]
    pub const fn voice(&self) -> Option<&Voice> {
        self.voice.as_ref()
    }

    /// True exactly while a recognition session is running
    #[must_use]
    pub const fn is_listening(&self) -> bool {
        self.listening
    }

    /// Handle that ends the current listening session early
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.source.stop_handle()
    }

    /// Run one recognition session
    ///
    /// Errors are surfaced as a notice before being returned.
    ///
    /// # Errors
    ///
    /// Returns the recognizer's error when no transcript was produced
    pub async fn listen(&mut self) -> std::result::Result<String, RecognitionError> {
        self.status.status(Status::Listening);

        let result = {
            let _listening = ListeningGuard::new(&mut self.listening);
            self.source.listen().await
        };

        self.status.status(Status::Idle);

        if let Err(e) = &result {
            tracing::debug!(code = %e, "recognition ended without transcript");
            if *e != RecognitionError::InputClosed {
                self.status.notice(Notice::Recognition(e.clone()));
            }
        }

        result
    }

    /// Route a transcript and produce the reply
    ///
    /// The lower-cased transcript is logged as the user's entry.
    pub async fn respond(&mut self, transcript: &str) -> String {
        let command = transcript.to_lowercase();
        self.log.append(Speaker::User, command.as_str());

        let route = self.router.classify(&command);
        tracing::info!(?route, "routing utterance");

        match route {
            Route::OpenApp => self.open_app.handle(&command),
            Route::Volume => self.volume.handle(&command),
            Route::Calculate => self.calculate.handle(&command),
            Route::Conversation => self.conversation.respond(&command).await,
        }
    }

    /// Log the reply and speak it, waiting for playback to finish
    ///
    /// A failing sink is reported as a notice; the reply stays in the log.
    pub async fn speak(&mut self, reply: &str) {
        self.log.append(Speaker::Assistant, reply);

        if let Err(e) = self.sink.speak(reply, self.voice.as_ref()).await {
            tracing::warn!(error = %e, "speech output failed");
            self.status.notice(Notice::SpeechFailed(e.to_string()));
        }
    }

    /// Listen, respond and speak once
    pub async fn run_turn(&mut self) -> TurnOutcome {
        let transcript = match self.listen().await {
            Ok(transcript) => transcript,
            Err(RecognitionError::InputClosed) => return TurnOutcome::Closed,
            Err(e) => return TurnOutcome::Aborted(e),
        };

        let reply = self.respond(&transcript).await;
        self.speak(&reply).await;
        TurnOutcome::Spoken(reply)
    }

    /// Store a new credential; returns whether it was accepted
    ///
    /// # Errors
    ///
    /// Returns error if the credential store cannot be written
    pub fn set_credential(&mut self, key: &str) -> Result<bool> {
        self.conversation.set_credential(key)
    }

    /// Forget the stored credential
    ///
    /// # Errors
    ///
    /// Returns error if the credential store cannot be written
    pub fn clear_credential(&mut self) -> Result<()> {
        self.conversation.clear_credential()
    }
}
