//! Console output formatting for conversations

use colored::Colorize;
use streamchat_domain::core::string::preview;
use streamchat_domain::{ConversationId, ConversationSummary, Message, Role, SessionState};

/// Width of message previews in listings.
const PREVIEW_CHARS: usize = 60;

/// Formats conversations and session results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    pub fn welcome(conversation_count: usize) -> String {
        let mut output = String::new();
        output.push('\n');
        output.push_str(&Self::header("streamchat"));
        output.push_str(&format!(
            "{} {}\n\n",
            "Conversations:".cyan().bold(),
            conversation_count
        ));
        output.push_str(&Self::help());
        output
    }

    pub fn help() -> String {
        let commands = [
            ("/new", "Start a new conversation"),
            ("/list", "List conversations, most recent first"),
            ("/switch <n|id>", "Switch to a conversation from /list"),
            ("/history", "Show the active conversation"),
            ("/cancel", "Cancel the reply being streamed"),
            ("/help", "Show this help"),
            ("/quit", "Exit"),
        ];

        let mut output = format!("{}\n", "Commands:".cyan().bold());
        for (command, description) in commands {
            output.push_str(&format!("  {:<16} - {}\n", command, description));
        }
        output.push_str("Press Ctrl-C while a reply streams to cancel it.\n");
        output
    }

    /// Numbered conversation list. `*` marks the active conversation,
    /// `~` one that is still receiving a reply.
    pub fn conversation_list(
        summaries: &[ConversationSummary],
        active: Option<&ConversationId>,
        streaming: Option<&ConversationId>,
    ) -> String {
        if summaries.is_empty() {
            return format!("{}\n", "No conversations".dimmed());
        }

        let mut output = String::new();
        for (i, summary) in summaries.iter().enumerate() {
            let marker = if Some(&summary.id) == active {
                "*".green().bold().to_string()
            } else {
                " ".to_string()
            };
            let live = if Some(&summary.id) == streaming {
                " ~".yellow().to_string()
            } else {
                String::new()
            };
            output.push_str(&format!(
                "{} {:>3}. {}{} {}\n",
                marker,
                i + 1,
                summary.title,
                live,
                summary.id.as_str().dimmed()
            ));
        }
        output
    }

    pub fn history(title: &str, messages: &[Message]) -> String {
        let mut output = Self::section_header(title);
        if messages.is_empty() {
            output.push_str(&format!("{}\n", "(no messages yet)".dimmed()));
            return output;
        }
        for message in messages {
            output.push_str(&format!(
                "{} {}\n",
                Self::role_label(message.role),
                message.content
            ));
        }
        output
    }

    /// One-line note after a reply settles; nothing for a normal completion.
    ///
    /// A failed reply shows `error_message`, the text that replaced it in
    /// the conversation.
    pub fn settled(state: SessionState, error_message: &str) -> Option<String> {
        match state {
            SessionState::Failed => Some(format!("{}", error_message.red().bold())),
            SessionState::Cancelled => Some(format!("{}", "(reply cancelled)".yellow())),
            _ => None,
        }
    }

    pub fn switched(summary: &ConversationSummary, message_count: usize) -> String {
        format!(
            "{} {} ({} messages)",
            "Switched to".cyan(),
            summary.title.bold(),
            message_count
        )
    }

    pub fn role_label(role: Role) -> String {
        match role {
            Role::User => "You:".green().bold().to_string(),
            Role::Assistant => "Assistant:".blue().bold().to_string(),
        }
    }

    pub fn question_preview(question: &str) -> String {
        preview(question, PREVIEW_CHARS)
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(50);
        format!("{}\n{}\n{}\n\n", line.cyan(), title.cyan().bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n", format!("── {} ──", title).yellow().bold())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: &str, title: &str) -> ConversationSummary {
        ConversationSummary {
            id: ConversationId::from(id),
            title: title.to_string(),
        }
    }

    #[test]
    fn test_conversation_list_numbers_and_marks() {
        let summaries = vec![summary("b", "Second"), summary("a", "First")];
        let active = ConversationId::from("a");
        let streaming = ConversationId::from("b");

        let output =
            ConsoleFormatter::conversation_list(&summaries, Some(&active), Some(&streaming));
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("1. Second"));
        assert!(lines[0].contains('~'));
        assert!(lines[1].contains("2. First"));
        assert!(lines[1].contains('*'));
    }

    #[test]
    fn test_history_lists_messages_in_order() {
        let messages = vec![Message::user("Hi"), Message::assistant("Hello!")];
        let output = ConsoleFormatter::history("Greeting", &messages);

        let you = output.find("Hi").unwrap();
        let assistant = output.find("Hello!").unwrap();
        assert!(you < assistant);
        assert!(output.contains("Greeting"));
    }

    #[test]
    fn test_settled_notes() {
        assert!(ConsoleFormatter::settled(SessionState::Completed, "oops").is_none());
        assert!(
            ConsoleFormatter::settled(SessionState::Failed, "Service unavailable")
                .unwrap()
                .contains("Service unavailable")
        );
        assert!(
            ConsoleFormatter::settled(SessionState::Cancelled, "oops")
                .unwrap()
                .contains("cancelled")
        );
    }

    #[test]
    fn test_help_lists_commands() {
        let help = ConsoleFormatter::help();
        for command in ["/new", "/list", "/switch", "/history", "/cancel", "/quit"] {
            assert!(help.contains(command), "missing {}", command);
        }
    }
}
