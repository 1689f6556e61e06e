//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to control the widget and browse the project gallery
//! without sending messages to the chat gateway.

/// A parsed chat command.
///
/// These commands control the widget and are not sent to the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Open the widget (starting the session on first use).
    Open,

    /// Close the widget; the conversation is kept.
    Close,

    /// Show the session id.
    Session,

    /// Show the question/answer pairs the gateway would receive.
    History,

    /// List projects, optionally limited to one category.
    Projects(Option<String>),

    /// List project categories.
    Categories,

    /// Show one project in detail.
    Project(String),

    /// Save the conversation to a file.
    SaveTranscript(String),

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Display session statistics.
    Stats,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a valid command,
/// or `None` if it should be treated as a regular message.
///
/// # Examples
///
/// ```
/// # use sitebot::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/projects Robotics").is_some());
/// assert!(parse_command("What does the club build?").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    let rest = input.strip_prefix('/')?;
    let mut parts = rest.splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "open" => ChatCommand::Open,
        "close" => ChatCommand::Close,
        "session" | "id" => ChatCommand::Session,
        "history" => ChatCommand::History,
        "projects" | "gallery" => ChatCommand::Projects(argument.map(|s| s.to_string())),
        "categories" => ChatCommand::Categories,
        "project" => match argument {
            Some(id) => ChatCommand::Project(id.to_string()),
            None => ChatCommand::Invalid("/project requires a project id".to_string()),
        },
        "save" => match argument {
            Some(arg) => ChatCommand::SaveTranscript(arg.to_string()),
            None => ChatCommand::Invalid("/save requires a file path".to_string()),
        },
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        "stats" | "status" => ChatCommand::Stats,
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /open                  Open the chat widget
  /close                 Close the chat widget (the conversation is kept)
  /session               Show the session id
  /history               Show the question/answer history sent upstream
  /projects [category]   List projects ('All' or no argument lists everything)
  /categories            List project categories
  /project <id>          Show one project in detail
  /save <file>           Save the conversation as JSON
  /stats                 Show session statistics
  /help                  Show this help message
  /quit                  Exit the chat"#
}
