//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::ReplConfig;
use crate::output::console::ConsoleFormatter;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::sync::Arc;
use streamchat_application::{
    AuthProvider, ChatSession, IgnoreReason, SendOutcome, SessionHandle,
};
use streamchat_domain::{ConversationId, ConversationSummary, SessionState};
use tracing::{debug, warn};

/// A slash command typed at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    New,
    List,
    Switch(String),
    History,
    Cancel,
    Help,
    Quit,
    Unknown(String),
}

impl ReplCommand {
    /// Parse a line starting with `/`. Returns `None` for ordinary input.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if !line.starts_with('/') {
            return None;
        }

        let (name, arg) = match line.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (line, ""),
        };

        let command = match name {
            "/new" | "/n" => ReplCommand::New,
            "/list" | "/ls" | "/l" => ReplCommand::List,
            "/switch" | "/s" if !arg.is_empty() => ReplCommand::Switch(arg.to_string()),
            "/history" | "/hist" => ReplCommand::History,
            "/cancel" => ReplCommand::Cancel,
            "/help" | "/h" | "/?" => ReplCommand::Help,
            "/quit" | "/exit" | "/q" => ReplCommand::Quit,
            _ => ReplCommand::Unknown(line.to_string()),
        };
        Some(command)
    }
}

/// Resolve a `/switch` argument: a 1-based position in `summaries` or a
/// full conversation id.
pub fn resolve_conversation(
    summaries: &[ConversationSummary],
    arg: &str,
) -> Option<ConversationId> {
    if let Ok(n) = arg.parse::<usize>() {
        return n
            .checked_sub(1)
            .and_then(|i| summaries.get(i))
            .map(|s| s.id.clone());
    }
    summaries
        .iter()
        .find(|s| s.id.as_str() == arg)
        .map(|s| s.id.clone())
}

/// Interactive chat REPL
pub struct ChatRepl {
    session: Arc<ChatSession>,
    auth: Arc<dyn AuthProvider>,
    config: ReplConfig,
}

impl ChatRepl {
    /// Create a new ChatRepl
    pub fn new(session: Arc<ChatSession>, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            session,
            auth,
            config: ReplConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ReplConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the interactive REPL
    pub async fn run(&self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        let history_path = self.config.resolve_history_file();
        if let Some(ref path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        println!("{}", ConsoleFormatter::welcome(self.session.summaries().len()));
        self.print_history();

        loop {
            match rl.readline(">>> ") {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    if let Some(command) = ReplCommand::parse(line) {
                        if self.handle_command(command) {
                            break;
                        }
                        continue;
                    }

                    let _ = rl.add_history_entry(line);
                    println!();
                    self.send(line).await;
                    println!();
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        if let Some(ref path) = history_path {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    /// Send one message in the active conversation and wait for the reply.
    ///
    /// Ctrl-C while waiting cancels the reply. Returns the terminal state,
    /// or `None` if nothing was sent.
    pub async fn send(&self, question: &str) -> Option<SessionState> {
        let Some(token) = self.auth.token() else {
            eprintln!("No auth token: pass --token or set STREAMCHAT_TOKEN");
            return None;
        };

        debug!("Sending: {}", ConsoleFormatter::question_preview(question));
        match self.session.send_message(question, token, None) {
            Ok(SendOutcome::Started(handle)) => Some(self.wait_for_reply(handle).await),
            Ok(SendOutcome::Ignored(IgnoreReason::Busy)) => {
                println!("A reply is still streaming; /cancel it or wait.");
                None
            }
            Ok(SendOutcome::Ignored(IgnoreReason::EmptyQuestion)) => None,
            Err(e) => {
                eprintln!("Error: {}", e);
                None
            }
        }
    }

    async fn wait_for_reply(&self, handle: SessionHandle) -> SessionState {
        let settled = handle.settled();
        tokio::pin!(settled);

        loop {
            tokio::select! {
                state = &mut settled => return state,
                signal = tokio::signal::ctrl_c() => {
                    if let Err(e) = signal {
                        warn!("Cannot listen for Ctrl-C: {}", e);
                        return settled.await;
                    }
                    self.session.cancel();
                }
            }
        }
    }

    /// Handle slash commands. Returns true if should exit.
    fn handle_command(&self, command: ReplCommand) -> bool {
        match command {
            ReplCommand::Quit => {
                println!("Bye!");
                return true;
            }
            ReplCommand::Help => println!("\n{}", ConsoleFormatter::help()),
            ReplCommand::New => match self.session.start_new_conversation() {
                Some(_) => println!("Started a new conversation."),
                None => println!("The current conversation is still empty."),
            },
            ReplCommand::List => {
                let active = self.session.store().active_id();
                let streaming = self.session.controller().active_target();
                print!(
                    "\n{}",
                    ConsoleFormatter::conversation_list(
                        &self.session.summaries(),
                        active.as_ref(),
                        streaming.as_ref(),
                    )
                );
                println!();
            }
            ReplCommand::Switch(arg) => self.switch(&arg),
            ReplCommand::History => self.print_history(),
            ReplCommand::Cancel => {
                if !self.session.cancel() {
                    println!("Nothing is streaming.");
                }
            }
            ReplCommand::Unknown(cmd) => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
            }
        }
        false
    }

    fn switch(&self, arg: &str) {
        let summaries = self.session.summaries();
        let Some(id) = resolve_conversation(&summaries, arg) else {
            println!("No conversation '{}'. Use /list to see them.", arg);
            return;
        };

        match self.session.switch_conversation(&id) {
            Ok(()) => {
                if let Some(conversation) = self.session.active_conversation() {
                    println!(
                        "{}",
                        ConsoleFormatter::switched(&conversation.summary(), conversation.len())
                    );
                }
            }
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    fn print_history(&self) {
        if let Some(conversation) = self.session.active_conversation()
            && !conversation.is_empty()
        {
            println!(
                "{}",
                ConsoleFormatter::history(conversation.title(), conversation.messages())
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: &str) -> ConversationSummary {
        ConversationSummary {
            id: ConversationId::from(id),
            title: id.to_uppercase(),
        }
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(ReplCommand::parse("hello"), None);
        assert_eq!(ReplCommand::parse("/new"), Some(ReplCommand::New));
        assert_eq!(ReplCommand::parse("  /list "), Some(ReplCommand::List));
        assert_eq!(
            ReplCommand::parse("/switch 2"),
            Some(ReplCommand::Switch("2".to_string()))
        );
        assert_eq!(ReplCommand::parse("/q"), Some(ReplCommand::Quit));
        assert_eq!(ReplCommand::parse("/history"), Some(ReplCommand::History));
        assert_eq!(ReplCommand::parse("/cancel"), Some(ReplCommand::Cancel));
    }

    #[test]
    fn test_switch_without_argument_is_unknown() {
        assert_eq!(
            ReplCommand::parse("/switch"),
            Some(ReplCommand::Unknown("/switch".to_string()))
        );
    }

    #[test]
    fn test_resolve_by_position_and_id() {
        let summaries = vec![summary("newest"), summary("older")];

        assert_eq!(
            resolve_conversation(&summaries, "1"),
            Some(ConversationId::from("newest"))
        );
        assert_eq!(
            resolve_conversation(&summaries, "2"),
            Some(ConversationId::from("older"))
        );
        assert_eq!(
            resolve_conversation(&summaries, "older"),
            Some(ConversationId::from("older"))
        );
        assert_eq!(resolve_conversation(&summaries, "0"), None);
        assert_eq!(resolve_conversation(&summaries, "3"), None);
        assert_eq!(resolve_conversation(&summaries, "missing"), None);
    }
}
