//! CLI entrypoint for streamchat
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use streamchat_application::{
    ChatSession, ConversationStore, KeyValueStorage, SnapshotStore, StaticAuthProvider,
    StreamingController,
};
use streamchat_domain::SessionState;
use streamchat_infrastructure::{
    ConfigLoader, FileConfig, FileKeyValueStorage, JsonlConversationLogger,
    MemoryKeyValueStorage, SseChatTransport,
};
use streamchat_presentation::{ChatRepl, Cli, ReplConfig, StreamReporter};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    config.validate().context("Invalid configuration")?;

    info!("Starting streamchat against {}", config.api.chat_url());

    let repl_config = repl_config(&config, cli.message.is_some());
    if !repl_config.color {
        colored::control::set_override(false);
    }

    let session = Arc::new(build_session(&cli, &config, repl_config.show_progress)?);
    if cli.reset {
        session
            .controller()
            .snapshots()
            .clear()
            .context("Could not forget saved conversations")?;
        info!("Saved conversations cleared");
    }
    let active = session.init();
    info!(
        "Active conversation {} ({} total)",
        active,
        session.store().len()
    );

    let auth = Arc::new(StaticAuthProvider::new(cli.token.clone()));
    let repl = ChatRepl::new(session, auth).with_config(repl_config);

    match &cli.message {
        Some(message) => match repl.send(message).await {
            Some(SessionState::Completed) => Ok(()),
            Some(state) => bail!("Reply did not complete: {}", state),
            None => bail!("Message was not sent"),
        },
        None => {
            repl.run().await?;
            Ok(())
        }
    }
}

/// Install the tracing subscriber.
///
/// Verbosity maps to warn/info/debug/trace. With `log_file` the output goes
/// to that file through a non-blocking writer instead of stderr.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let Some(path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .with_context(|| format!("Invalid log file path: {}", path.display()))?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Could not create log directory {}", dir.display()))?;

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Ok(Some(guard))
}

fn repl_config(config: &FileConfig, one_shot: bool) -> ReplConfig {
    ReplConfig {
        color: config.repl.color,
        // The spinner would end up in piped one-shot output
        show_progress: config.repl.show_progress && !one_shot,
        history_file: config.repl.history_file.as_ref().map(PathBuf::from),
    }
}

/// Wire transport, storage, logger and listener into a session.
fn build_session(cli: &Cli, config: &FileConfig, show_progress: bool) -> Result<ChatSession> {
    let storage: Arc<dyn KeyValueStorage> = if cli.ephemeral {
        info!("Ephemeral mode, conversations will not be saved");
        Arc::new(MemoryKeyValueStorage::new())
    } else {
        let dir = cli
            .storage_dir
            .clone()
            .unwrap_or_else(|| config.storage.resolve_dir());
        Arc::new(
            FileKeyValueStorage::open(&dir)
                .with_context(|| format!("Could not open storage at {}", dir.display()))?,
        )
    };
    let snapshots = Arc::new(SnapshotStore::with_key(storage, config.storage.key.clone()));

    let transport = Arc::new(
        SseChatTransport::new(
            config.api.chat_url(),
            Duration::from_secs(config.api.connect_timeout_secs),
        )
        .context("Could not create HTTP client")?
        .with_assistant_role(config.api.assistant_role.clone()),
    );

    let session_config = config.session.to_session_config();
    let reporter = Arc::new(
        StreamReporter::new()
            .with_progress(show_progress)
            .with_error_message(session_config.error_message.clone()),
    );

    let mut controller = StreamingController::new(
        transport,
        ConversationStore::new(),
        snapshots,
        session_config,
    )
    .with_listener(reporter);

    if let Some(path) = &config.logging.conversation_log {
        match JsonlConversationLogger::open(path) {
            Some(logger) => {
                info!("Writing conversation transcript to {}", logger.path().display());
                controller = controller.with_conversation_logger(Arc::new(logger));
            }
            None => warn!("Conversation transcript disabled"),
        }
    }

    Ok(ChatSession::new(controller))
}
