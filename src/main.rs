use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

use docqa::{
    Assistant, Config, FallbackMode, Format, IndexedDocument, Language, Segment, SpeakOutcome,
    Speaker, SpeechControl, extract_text, preview_text,
};

type StdinLines = Lines<BufReader<Stdin>>;

/// docqa - Ask questions about PDF and Word documents, and hear the answers
#[derive(Parser)]
#[command(name = "docqa", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the beginning of a document's extracted text
    Preview {
        /// PDF or DOCX file
        file: PathBuf,
    },
    /// Answer questions about a document
    Ask {
        /// PDF or DOCX file
        file: PathBuf,
        /// Question to answer; omit to read questions from stdin
        question: Option<String>,
        /// Interaction language ("en" or "kn")
        #[arg(short, long, env = "DOCQA_LANGUAGE")]
        lang: Option<String>,
        /// Speak each answer aloud (press Enter to stop)
        #[arg(short, long)]
        speak: bool,
        /// Let an explicitly empty "result" suppress the "answer" fallback
        #[arg(long)]
        key_presence: bool,
    },
    /// Speak a line of text through the configured TTS provider
    Say {
        /// Text to speak
        #[arg(default_value = "Hello! This is a test of the text to speech system.")]
        text: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn,docqa=info",
        1 => "info,docqa=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Preview { file } => cmd_preview(&file).await,
        Command::Ask {
            file,
            question,
            lang,
            speak,
            key_presence,
        } => cmd_ask(&file, question, lang.as_deref(), speak, key_presence).await,
        Command::Say { text } => cmd_say(&text).await,
    }
}

/// Print the document preview
async fn cmd_preview(file: &Path) -> anyhow::Result<()> {
    let segments = load_segments(file).await?;
    println!("{}", preview_text(&segments));
    Ok(())
}

/// Index a document and answer one question or a stream of them
async fn cmd_ask(
    file: &Path,
    question: Option<String>,
    lang: Option<&str>,
    speak: bool,
    key_presence: bool,
) -> anyhow::Result<()> {
    let config = Config::load()?;
    tracing::debug!(?config, "loaded configuration");

    let language = match lang {
        Some(l) => l.parse()?,
        None => config.language,
    };

    let mut settings = config.assistant_settings()?;
    if key_presence {
        settings.fallback = FallbackMode::KeyPresence;
    }

    let speaker = if speak {
        ensure_audio_output()?;
        Some(Speaker::new(
            Arc::new(config.text_to_speech()?),
            config.voice.volume,
        ))
    } else {
        None
    };

    let assistant = Assistant::new(
        Arc::new(config.chat_model()),
        Arc::new(config.embedder()),
        settings,
    );

    let segments = load_segments(file).await?;
    let document = assistant.index(&segments).await?;
    tracing::info!(chunks = document.chunk_count(), %language, "document ready");

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    if let Some(question) = question {
        return answer_one(&document, &question, language, speaker.as_ref(), &mut stdin).await;
    }

    loop {
        print!("Question (empty line to quit): ");
        std::io::stdout().flush()?;

        let Some(line) = stdin.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            break;
        }

        if let Err(e) = answer_one(&document, &line, language, speaker.as_ref(), &mut stdin).await
        {
            tracing::error!(error = %e, "failed to answer question");
        }
    }

    Ok(())
}

/// Speak a test line
async fn cmd_say(text: &str) -> anyhow::Result<()> {
    ensure_audio_output()?;
    let config = Config::load()?;
    let speaker = Speaker::new(Arc::new(config.text_to_speech()?), config.voice.volume);
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    speak_interruptibly(&speaker, text, &mut stdin).await
}

async fn answer_one(
    document: &IndexedDocument,
    question: &str,
    language: Language,
    speaker: Option<&Speaker>,
    stdin: &mut StdinLines,
) -> anyhow::Result<()> {
    let answer = document.ask(question, language).await?;
    println!("Answer: {answer}");

    if let Some(speaker) = speaker {
        speak_interruptibly(speaker, &answer, stdin).await?;
    }

    Ok(())
}

/// Extract a document off the async runtime, labelling segments with the
/// upload's path
async fn load_segments(path: &Path) -> anyhow::Result<Vec<Segment>> {
    let path = path.to_path_buf();

    let segments = tokio::task::spawn_blocking(move || -> docqa::Result<Vec<Segment>> {
        let format = Format::from_path(&path)?;
        let mut file = std::fs::File::open(&path)?;
        let source = path.display().to_string();

        Ok(extract_text(&mut file, format)?
            .into_iter()
            .map(|segment| segment.with_source(source.clone()))
            .collect())
    })
    .await??;

    tracing::info!(segments = segments.len(), "extracted document");
    Ok(segments)
}

/// Play `text` until it finishes or the user presses Enter
///
/// Enter only stops speech when stdin is a terminal; piped input is left for
/// the question loop.
async fn speak_interruptibly(
    speaker: &Speaker,
    text: &str,
    stdin: &mut StdinLines,
) -> anyhow::Result<()> {
    let samples = speaker.prepare(text).await?;
    if samples.is_empty() {
        return Ok(());
    }

    let control = SpeechControl::new();
    let player = control.clone();

    let input = if std::io::stdin().is_terminal() {
        println!("Speaking... press Enter to stop");
        Some(stdin)
    } else {
        println!("Speaking...");
        None
    };

    let playback = tokio::task::spawn_blocking(move || play(&samples, &player));
    let outcome = wait_for_playback(playback, &control, input).await?;

    if outcome == SpeakOutcome::Interrupted {
        println!("Stopped.");
    }
    Ok(())
}

/// Wait for playback, requesting a stop when a line arrives on `input`
///
/// End of input does not stop playback.
async fn wait_for_playback<R>(
    mut playback: JoinHandle<docqa::Result<SpeakOutcome>>,
    control: &SpeechControl,
    input: Option<&mut Lines<R>>,
) -> anyhow::Result<SpeakOutcome>
where
    R: AsyncBufRead + Unpin,
{
    let Some(input) = input else {
        return Ok(playback.await??);
    };

    tokio::select! {
        outcome = &mut playback => Ok(outcome??),
        line = input.next_line() => {
            match line {
                Ok(Some(_)) => control.request_stop(),
                Ok(None) => tracing::debug!("stdin closed while speaking"),
                Err(e) => tracing::warn!(error = %e, "failed to read stdin while speaking"),
            }
            Ok(playback.await??)
        }
    }
}

#[cfg(feature = "audio")]
#[allow(clippy::unnecessary_wraps)]
fn ensure_audio_output() -> anyhow::Result<()> {
    Ok(())
}

/// Refuse speech before any synthesis is paid for
#[cfg(not(feature = "audio"))]
fn ensure_audio_output() -> anyhow::Result<()> {
    Err(docqa::Error::Audio(
        "speaker output requires building with the `audio` feature".to_string(),
    )
    .into())
}

#[cfg(feature = "audio")]
fn play(samples: &[f32], control: &SpeechControl) -> docqa::Result<SpeakOutcome> {
    let mut sink = docqa::voice::AudioPlayback::new()?;
    docqa::voice::speak_samples(&mut sink, samples, control)
}

#[cfg(not(feature = "audio"))]
fn play(_samples: &[f32], _control: &SpeechControl) -> docqa::Result<SpeakOutcome> {
    Err(docqa::Error::Audio(
        "speaker output requires building with the `audio` feature".to_string(),
    ))
}
