use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Result, anyhow};
use clap::Parser;
use colored::Colorize;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use tokio::sync::{mpsc, watch};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use mhchat_application::{ChatController, ChatSession, SessionSettings, ViewEvent};
use mhchat_core::config::ChatConfig;
use mhchat_core::quick_action::QuickActionRegistry;
use mhchat_core::session::{MessageStore, SessionSnapshot};
use mhchat_infrastructure::{ConfigService, FileMessageStore, InMemoryMessageStore, MhChatPaths};
use mhchat_interaction::HttpChatClient;

mod helper;
mod render;
mod repl;

use helper::CliHelper;
use render::Transcript;
use repl::{Submit, Submitter};

const PROMPT: &str = ">> ";

#[derive(Parser)]
#[command(name = "mhchat", version)]
#[command(about = "Terminal client for the Mindhive chat API", long_about = None)]
struct Cli {
    /// Chat endpoint URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Session identity sent with every message
    #[arg(long)]
    session_id: Option<String>,

    /// Request timeout in seconds (0 disables the timeout)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Path to config.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for the message log and logs
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Keep the conversation in memory only
    #[arg(long)]
    ephemeral: bool,

    /// Log filter, e.g. `debug` or `mhchat_application=trace` (overrides RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    let data_dir = MhChatPaths::data_dir(config.data_dir.as_deref())?;
    let _log_guard = init_tracing(&MhChatPaths::logs_dir(&data_dir), cli.log_level.as_deref())?;

    tracing::info!(endpoint = %config.endpoint, ephemeral = cli.ephemeral, "Starting mhchat");

    // ===== Session =====
    let store: Arc<dyn MessageStore> = if cli.ephemeral {
        Arc::new(InMemoryMessageStore::new())
    } else {
        Arc::new(FileMessageStore::new(&data_dir, &config.storage_namespace))
    };
    let transport = Arc::new(HttpChatClient::new(&config.endpoint)?);
    let session = ChatSession::new(store, transport, SessionSettings::from_config(&config));
    let registry = session.registry().clone();

    let (controller, snapshots) = ChatController::new(session);
    let (event_tx, event_rx) = mpsc::channel::<ViewEvent>(32);

    println!("{}", "=== mhchat ===".bright_magenta().bold());
    println!(
        "{}",
        format!(
            "Connected to {}. Type ':reset' to clear the conversation or ':quit' to exit.",
            config.endpoint
        )
        .bright_black()
    );
    println!();

    let controller_task = tokio::spawn(controller.run(event_rx));
    let render_task = tokio::spawn(render_snapshots(snapshots.clone(), registry.clone()));

    // ===== REPL =====
    let helper = CliHelper::new(registry);
    let submitter = Submitter::new(event_tx, snapshots, tokio::runtime::Handle::current());
    tokio::task::spawn_blocking(move || run_repl(helper, submitter)).await??;

    let session = controller_task.await?;
    let _ = render_task.await;

    tracing::info!(messages = session.messages().len(), "mhchat stopped");
    println!("{}", "Goodbye!".bright_green());

    Ok(())
}

/// Builds the configuration: file, then environment, then flags.
fn load_config(cli: &Cli) -> Result<ChatConfig> {
    let service = match &cli.config {
        Some(path) => ConfigService::with_path(path.clone()),
        None => ConfigService::new_default()?,
    };

    let mut config = service.load_or_create()?;
    config.apply_env_overrides()?;

    if let Some(endpoint) = &cli.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(session_id) = &cli.session_id {
        config.session_id = session_id.clone();
    }
    if let Some(timeout_secs) = cli.timeout_secs {
        config.request_timeout_secs = timeout_secs;
    }
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = Some(data_dir.clone());
    }

    config.validate()?;
    Ok(config)
}

/// Sends logs to a daily file so they do not interleave with the prompt.
fn init_tracing(logs_dir: &Path, level: Option<&str>) -> Result<WorkerGuard> {
    std::fs::create_dir_all(logs_dir)?;

    let filter = match level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let appender = tracing_appender::rolling::daily(logs_dir, "mhchat.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {e}"))?;

    Ok(guard)
}

/// Prints every snapshot change until the controller stops.
async fn render_snapshots(
    mut snapshots: watch::Receiver<SessionSnapshot>,
    registry: QuickActionRegistry,
) {
    let mut transcript = Transcript::default();

    loop {
        let snapshot = snapshots.borrow_and_update().clone();
        for block in transcript.update(&snapshot, &registry) {
            println!("{block}");
        }

        if snapshots.changed().await.is_err() {
            break;
        }
    }
}

/// Blocking readline loop; forwards input to the controller.
fn run_repl(helper: CliHelper, mut submitter: Submitter) -> Result<()> {
    let mut rl: Editor<CliHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(helper));

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                let trimmed = line.trim();

                let submitted = match trimmed {
                    "" => continue,
                    ":quit" | ":q" => break,
                    ":reset" => submitter.reset(),
                    _ => {
                        let _ = rl.add_history_entry(trimmed);
                        submitter.submit(&line)
                    }
                };

                match submitted {
                    Submit::Sent => {}
                    Submit::Busy => println!(
                        "{}",
                        "Still waiting for the previous reply; message not sent.".yellow()
                    ),
                    Submit::Closed => return Ok(()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type ':quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}
