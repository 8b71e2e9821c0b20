//! Voice pipeline integration tests
//!
//! Tests voice components without requiring audio hardware

use std::io::Cursor;
use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use jarvis_voice::config::VoiceConfig;
use jarvis_voice::voice::{
    ConsoleSource, DetectorEvent, RecognitionError, SAMPLE_RATE, SpeechToText, TextToSpeech,
    TranscriptSource, UtteranceDetector, rms_energy, samples_to_wav,
};
use jarvis_voice::Error;

mod common;

/// Generate sine wave audio samples
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn generate_sine_samples(frequency: f32, duration_secs: f32, amplitude: f32) -> Vec<f32> {
    let num_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin()
        })
        .collect()
}

/// Generate silence
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn generate_silence(duration_secs: f32) -> Vec<f32> {
    let num_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;
    vec![0.0; num_samples]
}

fn voice_config(server_uri: &str) -> VoiceConfig {
    VoiceConfig {
        stt_url: format!("{server_uri}/v1/audio/transcriptions"),
        tts_url: format!("{server_uri}/v1/audio/speech"),
        ..VoiceConfig::default()
    }
}

fn credential() -> SecretString {
    SecretString::from(common::TEST_KEY.to_string())
}

#[test]
fn test_rms_energy() {
    assert!(rms_energy(&[]).abs() < f32::EPSILON);
    assert!(rms_energy(&generate_silence(0.1)).abs() < f32::EPSILON);

    // RMS of a sine is amplitude / sqrt(2)
    let energy = rms_energy(&generate_sine_samples(440.0, 0.5, 0.5));
    assert!((energy - 0.5 / 2f32.sqrt()).abs() < 0.01, "{energy}");
}

#[test]
fn test_detector_spoken_utterance() {
    let mut detector = UtteranceDetector::new(
        Duration::from_millis(800),
        Duration::from_secs(5),
        Duration::from_secs(10),
    );

    let mut events = Vec::new();
    let audio = [
        generate_silence(0.3),
        generate_sine_samples(300.0, 1.0, 0.4),
        generate_silence(1.0),
    ]
    .concat();

    for block in audio.chunks(1600) {
        events.push(detector.push(block));
        if events.last() == Some(&DetectorEvent::Complete) {
            break;
        }
    }

    assert_eq!(events.first(), Some(&DetectorEvent::Waiting));
    assert!(events.contains(&DetectorEvent::Speaking));
    assert_eq!(events.last(), Some(&DetectorEvent::Complete));

    // 1s of speech plus 0.8s of trailing silence
    let speech = detector.take_speech();
    assert_eq!(speech.len(), 16000 + 12800);
}

#[test]
fn test_detector_silence_only() {
    let mut detector = UtteranceDetector::new(
        Duration::from_millis(800),
        Duration::from_secs(1),
        Duration::from_secs(10),
    );

    let last = generate_silence(1.0)
        .chunks(1600)
        .map(|block| detector.push(block))
        .last();

    assert_eq!(last, Some(DetectorEvent::NoSpeech));
    assert!(!detector.has_speech());
}

#[test]
fn test_samples_to_wav() {
    let samples = generate_sine_samples(440.0, 0.1, 0.5);
    let wav_data = samples_to_wav(&samples, SAMPLE_RATE).unwrap();

    // Check WAV header magic
    assert_eq!(&wav_data[0..4], b"RIFF");
    assert_eq!(&wav_data[8..12], b"WAVE");

    // WAV should have reasonable size
    assert!(wav_data.len() > 44); // WAV header is 44 bytes
}

#[test]
fn test_wav_roundtrip() {
    let original_samples: Vec<f32> = vec![0.0, 0.5, -0.5, 1.0, -1.0, 0.25];
    let wav_data = samples_to_wav(&original_samples, SAMPLE_RATE).unwrap();

    let mut reader = hound::WavReader::new(Cursor::new(wav_data)).unwrap();

    let spec = reader.spec();
    assert_eq!(spec.sample_rate, SAMPLE_RATE);
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.bits_per_sample, 16);

    let samples: Vec<i16> = reader.samples::<i16>().map(Result::unwrap).collect();
    assert_eq!(samples.len(), original_samples.len());
    assert_eq!(samples[0], 0);
    assert_eq!(samples[3], 32767);
}

#[test]
fn test_recognition_messages() {
    assert_eq!(
        RecognitionError::PermissionDenied.user_message(),
        "Microphone access was denied. Please allow microphone access in your settings and try again."
    );
    assert_eq!(
        RecognitionError::NoSpeech.user_message(),
        "No speech was detected. Please try again."
    );
    assert_eq!(
        RecognitionError::NoMicrophone.user_message(),
        "No microphone was found. Please ensure your microphone is connected and try again."
    );
    assert_eq!(
        RecognitionError::Network.user_message(),
        "Network error occurred. Please check your internet connection."
    );
    assert_eq!(
        RecognitionError::from_code("language-not-supported").user_message(),
        "Error occurred in recognition: language-not-supported"
    );
}

#[tokio::test]
async fn test_console_source_lines() {
    let mut source = ConsoleSource::new(&b"What time is it\n"[..]);
    assert_eq!(source.listen().await.unwrap(), "What time is it");
    assert_eq!(source.listen().await, Err(RecognitionError::InputClosed));
}

#[tokio::test]
async fn test_transcription_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/audio/transcriptions"))
        .and(header("authorization", "Bearer sk-test-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": "Open YouTube."})))
        .expect(1)
        .mount(&server)
        .await;

    let stt = SpeechToText::new(&voice_config(&server.uri()));
    let wav = samples_to_wav(&generate_sine_samples(300.0, 0.5, 0.3), SAMPLE_RATE).unwrap();

    let text = stt.transcribe(&credential(), wav).await.unwrap();
    assert_eq!(text, "Open YouTube.");
}

#[tokio::test]
async fn test_transcription_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/audio/transcriptions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;

    let stt = SpeechToText::new(&voice_config(&server.uri()));
    let err = stt.transcribe(&credential(), Vec::new()).await.unwrap_err();

    assert!(
        matches!(&err, Error::SttRejected { status, body }
            if *status == reqwest::StatusCode::UNAUTHORIZED && body == "unauthorized"),
        "{err}"
    );
}

#[tokio::test]
async fn test_speech_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/audio/speech"))
        .and(header("authorization", "Bearer sk-test-123"))
        .and(body_partial_json(json!({
            "model": "tts-1",
            "input": "Opening youtube",
            "voice": "nova",
            "speed": 1.0
        })))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xFB, 0x90, 0x64]))
        .expect(1)
        .mount(&server)
        .await;

    let tts = TextToSpeech::new(&voice_config(&server.uri()));
    let audio = tts
        .synthesize(&credential(), "Opening youtube", "nova")
        .await
        .unwrap();

    assert_eq!(audio, vec![0xFF, 0xFB, 0x90, 0x64]);
}

#[tokio::test]
async fn test_speech_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/audio/speech"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let tts = TextToSpeech::new(&voice_config(&server.uri()));
    let err = tokio_test::assert_err!(tts.synthesize(&credential(), "hi", "alloy").await);

    assert!(matches!(err, Error::Tts(_)));
}
