use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use jarvis_voice::commands::{OpenAppHandler, SystemUrlOpener};
use jarvis_voice::session_log::StdoutLogDisplay;
use jarvis_voice::status::TerminalStatus;
use jarvis_voice::voice::{
    AudioCapture, AudioPlayback, ConsoleSource, MicrophoneSource, SpeechSink, SpokenSink,
    TextOnlySink, TextToSpeech, TranscriptSource, rms_energy,
};
use jarvis_voice::{
    Assistant, ChatClient, Config, ConversationalSession, CredentialStore, SessionLog,
    SqliteCredentialStore, Status, StatusSink, TurnOutcome, db,
};

/// JARVIS - Voice assistant with local commands and a chat model
#[derive(Parser)]
#[command(name = "jarvis", version, about)]
struct Cli {
    /// Type utterances instead of speaking them
    #[arg(long, env = "JARVIS_TEXT_MODE")]
    text: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Handle one utterance and print the reply
    Ask {
        /// What to say, e.g. "calculate 2 plus 2"
        #[arg(required = true, num_args = 1..)]
        utterance: Vec<String>,
        /// Also speak the reply aloud
        #[arg(long)]
        speak: bool,
    },
    /// Store the OpenAI API key (prompts when omitted)
    SetKey {
        key: Option<String>,
    },
    /// Erase the stored API key
    ClearKey,
    /// Show whether an API key is stored
    KeyStatus,
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Test TTS output
    TestTts {
        /// Text to speak
        #[arg(default_value = "Hello! I am JARVIS. This is a test of the speech system.")]
        text: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "warn,jarvis_voice=info",
        2 => "info,jarvis_voice=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::future_not_send)]
async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load()?;
    tracing::debug!(?config, "loaded configuration");

    let store = open_store(&config)?;

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::Ask { utterance, speak } => {
                ask(&config, store, &utterance.join(" "), speak).await
            }
            Command::SetKey { key } => set_key(&config, store, key),
            Command::ClearKey => {
                store.remove()?;
                println!("API key removed.");
                Ok(())
            }
            Command::KeyStatus => {
                let state = if store.get()?.is_some() {
                    "configured"
                } else {
                    "not configured"
                };
                println!("API key: {state}");
                Ok(())
            }
            Command::TestMic { duration } => test_mic(duration).await,
            Command::TestTts { text } => test_tts(&config, store.as_ref(), &text).await,
        };
    }

    if cli.text {
        let source = Box::new(ConsoleSource::stdin());
        let assistant = build_assistant(&config, store, source, Box::new(TextOnlySink))?;
        run_text(assistant).await
    } else {
        let source = Box::new(MicrophoneSource::new(&config.voice, Arc::clone(&store)));
        let sink = Box::new(SpokenSink::new(&config.voice, Arc::clone(&store)));
        let assistant = build_assistant(&config, store, source, sink)?;
        run_voice(assistant).await
    }
}

fn open_store(config: &Config) -> anyhow::Result<Arc<dyn CredentialStore>> {
    let pool = db::init(config.db_path())?;
    Ok(Arc::new(SqliteCredentialStore::new(pool)))
}

fn build_session(
    config: &Config,
    store: Arc<dyn CredentialStore>,
    status: Arc<dyn StatusSink>,
) -> anyhow::Result<ConversationalSession> {
    let client = ChatClient::new(&config.chat)?;
    Ok(ConversationalSession::new(
        client,
        store,
        status,
        config.chat.history_limit,
    )?)
}

fn build_assistant(
    config: &Config,
    store: Arc<dyn CredentialStore>,
    source: Box<dyn TranscriptSource>,
    sink: Box<dyn SpeechSink>,
) -> anyhow::Result<Assistant> {
    let status: Arc<dyn StatusSink> = Arc::new(TerminalStatus);
    let conversation = build_session(config, store, Arc::clone(&status))?;
    let open_app = OpenAppHandler::new(Arc::new(SystemUrlOpener))
        .with_extra_apps(config.apps.iter().map(|(name, url)| (name, url)))?;

    Ok(Assistant::new(conversation, open_app, source, sink, status)
        .with_log(SessionLog::with_display(Box::new(StdoutLogDisplay))))
}

/// Enter starts listening; Enter again while listening stops early
#[allow(clippy::future_not_send)]
async fn run_voice(mut assistant: Assistant) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("JARVIS ready. Press Enter to talk, type q to quit.");

    loop {
        eprintln!("[{}]", Status::Idle);
        match lines.next_line().await? {
            None => break,
            Some(line) if matches!(line.trim(), "q" | "quit" | "exit") => break,
            Some(_) => {}
        }

        let stop = assistant.stop_handle();
        let turn = assistant.run_turn();
        tokio::pin!(turn);

        let mut stop_requested = false;
        let outcome = loop {
            tokio::select! {
                outcome = &mut turn => break outcome,
                _ = lines.next_line(), if !stop_requested => {
                    stop_requested = true;
                    stop.stop();
                }
            }
        };

        tracing::debug!(?outcome, "turn finished");
        if outcome == TurnOutcome::Closed {
            break;
        }
    }

    Ok(())
}

/// Each typed line is one utterance, until end of input
#[allow(clippy::future_not_send)]
async fn run_text(mut assistant: Assistant) -> anyhow::Result<()> {
    println!("JARVIS ready. Type a request, Ctrl-D to quit.");

    loop {
        let outcome = assistant.run_turn().await;
        tracing::debug!(?outcome, "turn finished");
        if outcome == TurnOutcome::Closed {
            return Ok(());
        }
    }
}

#[allow(clippy::future_not_send)]
async fn ask(
    config: &Config,
    store: Arc<dyn CredentialStore>,
    utterance: &str,
    speak: bool,
) -> anyhow::Result<()> {
    let sink: Box<dyn SpeechSink> = if speak {
        Box::new(SpokenSink::new(&config.voice, Arc::clone(&store)))
    } else {
        Box::new(TextOnlySink)
    };
    let source = Box::new(ConsoleSource::new(tokio::io::empty()));
    let mut assistant = build_assistant(config, store, source, sink)?;

    let reply = assistant.respond(utterance).await;
    assistant.speak(&reply).await;

    Ok(())
}

fn set_key(
    config: &Config,
    store: Arc<dyn CredentialStore>,
    key: Option<String>,
) -> anyhow::Result<()> {
    let key = match key {
        Some(key) => key,
        None => dialoguer::Password::new()
            .with_prompt("OpenAI API key")
            .allow_empty_password(true)
            .interact()?,
    };

    let status: Arc<dyn StatusSink> = Arc::new(TerminalStatus);
    let mut session = build_session(config, store, status)?;
    if !session.set_credential(&key)? {
        anyhow::bail!("no API key given");
    }

    Ok(())
}

/// Test microphone input
async fn test_mic(duration: u64) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds...");
    println!("Speak into your microphone!\n");

    let mut capture = AudioCapture::new()?;
    capture.start()?;

    for i in 0..duration {
        tokio::time::sleep(Duration::from_secs(1)).await;

        let samples = capture.take_buffer();
        let energy = rms_energy(&samples);
        let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let meter_len = (energy * 100.0).min(50.0) as usize;
        let meter = "#".repeat(meter_len) + &" ".repeat(50 - meter_len);

        println!("[{:2}s] RMS: {energy:.4} | Peak: {peak:.4} | [{meter}]", i + 1);
    }

    capture.stop();

    println!("\n---");
    println!("If you saw movement in the meter, your mic is working!");
    println!("If RMS stayed near 0, check that the mic is plugged in and not muted.");

    Ok(())
}

/// Test TTS output
#[allow(clippy::future_not_send)]
async fn test_tts(config: &Config, store: &dyn CredentialStore, text: &str) -> anyhow::Result<()> {
    println!("Testing TTS with text: \"{text}\"\n");

    let Some(credential) = store.get()? else {
        anyhow::bail!("no API key stored; run `jarvis set-key` first");
    };

    let voice = config.voice.tts_voice.as_deref().unwrap_or("alloy");
    let tts = TextToSpeech::new(&config.voice);

    println!("Synthesizing speech...");
    let mp3_data = tts.synthesize(&credential, text, voice).await?;
    println!("Got {} bytes of audio data", mp3_data.len());

    println!("Playing audio...");
    let playback = AudioPlayback::new()?;
    playback.play_mp3(&mp3_data).await?;

    println!("\n---");
    println!("If you heard the speech, TTS is working!");

    Ok(())
}
