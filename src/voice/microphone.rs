//! Microphone transcript source
//!
//! Records from the default input device until the speaker pauses, then sends
//! the utterance to the transcription endpoint. End of speech is found with a
//! simple energy gate.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::capture::{AudioCapture, SAMPLE_RATE, rms_energy, samples_to_wav};
use super::stt::SpeechToText;
use super::{RecognitionError, StopHandle, TranscriptSource};
use crate::config::VoiceConfig;
use crate::credentials::CredentialStore;
use crate::Error;

/// Minimum audio energy threshold to consider speech
const ENERGY_THRESHOLD: f32 = 0.03;

/// Minimum duration of speech worth transcribing (in samples at 16kHz)
const MIN_SPEECH_SAMPLES: usize = 4800; // 0.3 seconds

/// How often the capture buffer is drained
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// What the detector concluded after a block of samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorEvent {
    /// Nothing said yet
    Waiting,
    /// Speech in progress
    Speaking,
    /// Speech followed by enough silence, or the session hit its length cap
    Complete,
    /// Nothing said before the no-speech timeout
    NoSpeech,
}

/// Energy-based end-of-utterance detector
#[derive(Debug)]
pub struct UtteranceDetector {
    speech: Vec<f32>,
    silence: usize,
    elapsed: usize,
    end_silence: usize,
    no_speech: usize,
    max_len: usize,
}

#[allow(clippy::cast_possible_truncation)]
const fn samples_for(duration: Duration) -> usize {
    let samples = duration.as_millis().saturating_mul(SAMPLE_RATE as u128) / 1000;
    if samples > usize::MAX as u128 {
        usize::MAX
    } else {
        samples as usize
    }
}

impl UtteranceDetector {
    /// Create a detector from voice timing settings
    #[must_use]
    pub const fn new(end_silence: Duration, no_speech: Duration, max_listen: Duration) -> Self {
        Self {
            speech: Vec::new(),
            silence: 0,
            elapsed: 0,
            end_silence: samples_for(end_silence),
            no_speech: samples_for(no_speech),
            max_len: samples_for(max_listen),
        }
    }

    /// Feed the next block of samples
    pub fn push(&mut self, samples: &[f32]) -> DetectorEvent {
        self.elapsed += samples.len();
        let energy = rms_energy(samples);
        let is_speech = energy > ENERGY_THRESHOLD;

        if self.speech.is_empty() {
            if !is_speech {
                return if self.elapsed >= self.no_speech {
                    DetectorEvent::NoSpeech
                } else {
                    DetectorEvent::Waiting
                };
            }
            tracing::trace!(energy, "speech detected");
        }

        self.speech.extend_from_slice(samples);
        if is_speech {
            self.silence = 0;
        } else {
            self.silence += samples.len();
        }

        let long_enough = self.speech.len() - self.silence >= MIN_SPEECH_SAMPLES;
        if self.silence >= self.end_silence {
            if long_enough {
                tracing::debug!(samples = self.speech.len(), "utterance complete");
                return DetectorEvent::Complete;
            }
            // A click or cough, not speech
            self.speech.clear();
            self.silence = 0;
            return DetectorEvent::Waiting;
        }

        if self.elapsed >= self.max_len {
            return DetectorEvent::Complete;
        }

        DetectorEvent::Speaking
    }

    #[must_use]
    pub fn has_speech(&self) -> bool {
        !self.speech.is_empty()
    }

    /// Take the recorded utterance, leaving the detector empty
    pub fn take_speech(&mut self) -> Vec<f32> {
        self.silence = 0;
        std::mem::take(&mut self.speech)
    }
}

/// Listens on the microphone and transcribes through Whisper
pub struct MicrophoneSource {
    stt: SpeechToText,
    credentials: Arc<dyn CredentialStore>,
    end_silence: Duration,
    no_speech: Duration,
    max_listen: Duration,
    stop: StopHandle,
}

impl MicrophoneSource {
    #[must_use]
    pub fn new(config: &VoiceConfig, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            stt: SpeechToText::new(config),
            credentials,
            end_silence: config.end_silence,
            no_speech: config.no_speech_timeout,
            max_listen: config.max_listen,
            stop: StopHandle::new(),
        }
    }

    /// Record until the utterance ends, the session is stopped or times out
    async fn record(&self) -> Result<Vec<f32>, RecognitionError> {
        let mut capture = AudioCapture::new().map_err(|e| {
            tracing::warn!(error = %e, "no usable input device");
            RecognitionError::NoMicrophone
        })?;
        capture.start().map_err(|e| {
            tracing::warn!(error = %e, "input stream refused");
            RecognitionError::PermissionDenied
        })?;

        let mut detector = UtteranceDetector::new(self.end_silence, self.no_speech, self.max_listen);

        loop {
            tokio::time::sleep(POLL_INTERVAL).await;

            let event = detector.push(&capture.take_buffer());

            if self.stop.is_stopped() {
                tracing::debug!(has_speech = detector.has_speech(), "listening stopped");
                return if detector.has_speech() {
                    Ok(detector.take_speech())
                } else {
                    Err(RecognitionError::Aborted)
                };
            }

            match event {
                DetectorEvent::Complete => return Ok(detector.take_speech()),
                DetectorEvent::NoSpeech => return Err(RecognitionError::NoSpeech),
                DetectorEvent::Waiting | DetectorEvent::Speaking => {}
            }
        }
    }
}

/// Recognition code for a failed transcription
fn transcription_failure(error: &Error) -> RecognitionError {
    match error {
        Error::Http(_) => RecognitionError::Network,
        Error::SttRejected { status, .. } if *status == reqwest::StatusCode::UNAUTHORIZED => {
            RecognitionError::ServiceNotAllowed
        }
        _ => RecognitionError::Other("service-error".to_string()),
    }
}

#[async_trait(?Send)]
impl TranscriptSource for MicrophoneSource {
    async fn listen(&mut self) -> Result<String, RecognitionError> {
        self.stop.reset();

        let credential = match self.credentials.get() {
            Ok(Some(credential)) => credential,
            Ok(None) => return Err(RecognitionError::ServiceNotAllowed),
            Err(e) => {
                tracing::warn!(error = %e, "could not read credential");
                return Err(RecognitionError::Other("credential-unavailable".to_string()));
            }
        };

        let speech = self.record().await?;
        let wav = samples_to_wav(&speech, SAMPLE_RATE)
            .map_err(|e| RecognitionError::Other(e.to_string()))?;

        match self.stt.transcribe(&credential, wav).await {
            Ok(text) if text.trim().is_empty() => Err(RecognitionError::NoSpeech),
            Ok(text) => Ok(text.trim().to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "transcription failed");
                Err(transcription_failure(&e))
            }
        }
    }

    fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }
}
