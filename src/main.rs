use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;
use voice_chat_rs::{
    commands::CommandRouter,
    config::{load_config, ConfigError, ConversationConfig},
    controller::{TurnController, TurnEvent},
    history::{JsonlHistoryStore, TranscriptLog},
    llm::{
        client::{GeminiLLM, LLMConfig},
        context::ContextStore,
        generator::GeminiGenerator,
    },
    speech::ConsoleSpeech,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Append diagnostic log lines to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Plain-text transcript of completed turns
    #[arg(long, default_value = "conversation_history.txt")]
    transcript_file: PathBuf,

    /// JSON-lines history of completed turns
    #[arg(long, default_value = "conversation_history.jsonl")]
    history_file: PathBuf,

    /// Gemini model name
    #[arg(long, default_value = "gemini-1.5-flash")]
    model: String,

    #[arg(long, default_value_t = 100)]
    max_tokens: u32,

    #[arg(long, default_value_t = 0.3)]
    temperature: f32,

    /// Give up on a generation request after this many seconds
    #[arg(long, default_value_t = 30)]
    generation_timeout_secs: u64,

    /// Keep only the most recent N turns in the prompt (default: keep all)
    #[arg(long)]
    history_window: Option<usize>,

    /// Saying this ends the conversation
    #[arg(long, default_value = "종료")]
    termination_keyword: String,
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    if let Some(path) = log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}

/// Pass failure events to `report` until the channel closes
async fn report_failures<F>(mut events: broadcast::Receiver<TurnEvent>, mut report: F)
where
    F: FnMut(String),
{
    loop {
        match events.recv().await {
            Ok(TurnEvent::RecognitionFailed(detail)) => {
                report(format!("⚠️  음성 인식 실패: {}", detail));
            }
            Ok(TurnEvent::GenerationFailed(detail)) => {
                report(format!("❌ Gemini API 요청 오류: {}", detail));
            }
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                log::warn!("Event printer fell behind, skipped {} events", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }
}

/// Mirror failures on the terminal the way a UI would surface them
fn spawn_event_printer(events: broadcast::Receiver<TurnEvent>) {
    tokio::spawn(report_failures(events, |line| eprintln!("{}", line)));
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;
    log::info!("🚀 Starting voice-chat with args: {:?}", args);

    let api_config = match load_config() {
        Ok(config) => config,
        Err(e @ ConfigError::MissingEnvVar(_)) => {
            eprintln!("❌ {}", e);
            eprintln!("   API 키가 설정되지 않았습니다. .env 파일을 확인하세요.");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let llm_config = LLMConfig {
        model: args.model.clone(),
        ..LLMConfig::default()
    };
    let llm = GeminiLLM::with_config(api_config.google_key().to_string(), llm_config)
        .context("Failed to create Gemini client")?;
    log::info!("🧠 Gemini client initialized ({})", args.model);

    let conversation = ConversationConfig {
        termination_keyword: args.termination_keyword.clone(),
        max_tokens: args.max_tokens,
        temperature: args.temperature,
        generation_timeout: Duration::from_secs(args.generation_timeout_secs),
        ..ConversationConfig::default()
    };

    let context = ContextStore::new(args.history_window)
        .with_store(Arc::new(JsonlHistoryStore::new(&args.history_file)));
    let transcript = Arc::new(TranscriptLog::new(&args.transcript_file));

    let shutdown = CancellationToken::new();
    let speech = ConsoleSpeech::stdio(shutdown.clone());

    let mut controller = TurnController::new(
        Box::new(speech),
        Arc::new(GeminiGenerator::new(llm)),
        CommandRouter::with_default_commands(),
        context,
        transcript,
        conversation,
    );
    spawn_event_printer(controller.subscribe());

    let ctrl_c_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Received Ctrl+C, shutting down...");
            ctrl_c_token.cancel();
        }
    });

    println!("🎧 대화를 시작합니다. '{}'라고 말하면 종료합니다.", args.termination_keyword);

    controller.run(shutdown).await?;

    println!("\n👋 Goodbye!");

    // A pending stdin read would otherwise keep the runtime from shutting down
    std::process::exit(0);
}
