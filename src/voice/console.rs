//! Typed input and text-only output for terminals without audio

use std::io::Write;

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

use super::{RecognitionError, SpeechSink, StopHandle, TranscriptSource, Voice};
use crate::Result;

/// Treats each line read from `reader` as one finalized transcript
pub struct ConsoleSource<R> {
    lines: Lines<R>,
    prompt: bool,
    stop: StopHandle,
}

impl ConsoleSource<BufReader<Stdin>> {
    /// Read utterances from stdin, printing a prompt before each one
    #[must_use]
    pub fn stdin() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            prompt: true,
            stop: StopHandle::new(),
        }
    }
}

impl<R: AsyncBufRead + Unpin> ConsoleSource<R> {
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            prompt: false,
            stop: StopHandle::new(),
        }
    }
}

#[async_trait(?Send)]
impl<R: AsyncBufRead + Unpin> TranscriptSource for ConsoleSource<R> {
    async fn listen(&mut self) -> std::result::Result<String, RecognitionError> {
        self.stop.reset();

        if self.prompt {
            print!("> ");
            let _ = std::io::stdout().flush();
        }

        match self.lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => Err(RecognitionError::NoSpeech),
            Ok(Some(line)) => Ok(line.trim().to_string()),
            Ok(None) => Err(RecognitionError::InputClosed),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read input");
                Err(RecognitionError::Other("input-error".to_string()))
            }
        }
    }

    fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }
}

/// Replies appear only in the session log
#[derive(Debug, Default)]
pub struct TextOnlySink;

#[async_trait(?Send)]
impl SpeechSink for TextOnlySink {
    fn voices(&self) -> Vec<Voice> {
        vec![Voice::new("text", "en-US")]
    }

    async fn speak(&mut self, _text: &str, _voice: Option<&Voice>) -> Result<()> {
        Ok(())
    }
}
