//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for streamchat
#[derive(Parser, Debug)]
#[command(name = "streamchat")]
#[command(author, version, about = "Terminal chat client for streaming assistant replies")]
#[command(long_about = r#"
streamchat keeps several independent conversations with a chat backend and
streams each assistant reply as it is generated.

Conversations are saved after every reply and restored on the next start.
Press Ctrl-C while a reply is streaming to cancel it.

Configuration files are loaded from (in priority order):
1. STREAMCHAT_* environment variables (e.g. STREAMCHAT_API__BASE_URL)
2. --config <path>        Explicit config file
3. ./streamchat.toml      Project-level config
4. ~/.config/streamchat/config.toml   Global config

Example:
  streamchat
  streamchat --token "$TOKEN" "Summarize the plot of Hamlet"
  streamchat --ephemeral
  streamchat --reset --storage-dir /tmp/chats
"#)]
pub struct Cli {
    /// Send a single message, print the reply and exit
    pub message: Option<String>,

    /// Bearer token for the chat backend
    #[arg(long, env = "STREAMCHAT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Write diagnostic logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Directory for saved conversations (overrides [storage] dir)
    #[arg(long, value_name = "DIR")]
    pub storage_dir: Option<PathBuf>,

    /// Keep conversations in memory only
    #[arg(long)]
    pub ephemeral: bool,

    /// Forget saved conversations before starting
    #[arg(long, conflicts_with = "ephemeral")]
    pub reset: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}
