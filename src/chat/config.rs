//! Configuration types for the chat widget.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior.

use std::env;
use std::time::Duration;

use arrrg_derive::CommandLine;

use crate::client::{DEFAULT_CHAT_URL, DEFAULT_TIMEOUT, FALLBACK_ANSWER};
use crate::session::DEFAULT_GREETING;

/// Environment variable consulted for the chat gateway endpoint.
pub const CHAT_URL_ENV: &str = "SITEBOT_CHAT_URL";

/// Environment variable consulted for the contact relay endpoint.
pub const CONTACT_URL_ENV: &str = "SITEBOT_CONTACT_URL";

/// Environment variable consulted for the project listing (URL or path).
pub const PROJECTS_ENV: &str = "SITEBOT_PROJECTS";

/// Command-line arguments for the sitebot-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Chat gateway endpoint.
    #[arrrg(optional, "Chat gateway URL (default: $SITEBOT_CHAT_URL)", "URL")]
    pub chat_url: Option<String>,

    /// Project listing to browse.
    #[arrrg(optional, "Project listing URL or path (default: $SITEBOT_PROJECTS)", "SOURCE")]
    pub projects: Option<String>,

    /// Transport timeout in seconds.
    #[arrrg(optional, "Request timeout in seconds (default: 30)", "SECONDS")]
    pub timeout: Option<u64>,

    /// Greeting shown when the session starts.
    #[arrrg(optional, "Greeting shown when the chat opens", "TEXT")]
    pub greeting: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a chat widget.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments and the environment with appropriate defaults.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Chat gateway endpoint.
    pub chat_url: String,

    /// Project listing, as a URL or a local path.
    pub projects: Option<String>,

    /// Transport timeout applied to every outbound request.
    pub timeout: Duration,

    /// Text of the greeting that opens every session.
    pub greeting: String,

    /// Text appended as the bot reply when the gateway call fails.
    pub fallback_answer: String,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Chat URL: `http://127.0.0.1:8000/chat`
    /// - Timeout: 30 seconds
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            chat_url: DEFAULT_CHAT_URL.to_string(),
            projects: None,
            timeout: DEFAULT_TIMEOUT,
            greeting: DEFAULT_GREETING.to_string(),
            fallback_answer: FALLBACK_ANSWER.to_string(),
            use_color: true,
        }
    }

    /// Sets the chat gateway endpoint.
    pub fn with_chat_url(mut self, url: impl Into<String>) -> Self {
        self.chat_url = url.into();
        self
    }

    /// Sets the project listing source.
    pub fn with_projects(mut self, source: Option<String>) -> Self {
        self.projects = source;
        self
    }

    /// Sets the transport timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the session greeting.
    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = greeting.into();
        self
    }

    /// Sets the reply used when the gateway fails.  Blank text keeps the
    /// built-in fallback so a failed send still produces a visible reply.
    pub fn with_fallback_answer(mut self, fallback: impl Into<String>) -> Self {
        let fallback = fallback.into();
        if !fallback.trim().is_empty() {
            self.fallback_answer = fallback;
        }
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        let defaults = ChatConfig::new();
        ChatConfig {
            chat_url: args
                .chat_url
                .or_else(|| env::var(CHAT_URL_ENV).ok())
                .unwrap_or(defaults.chat_url),
            projects: args.projects.or_else(|| env::var(PROJECTS_ENV).ok()),
            timeout: args
                .timeout
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            greeting: args.greeting.unwrap_or(defaults.greeting),
            use_color: !args.no_color,
            ..ChatConfig::new()
        }
    }
}

/// Command-line arguments for the sitebot-contact tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ContactArgs {
    /// Contact relay endpoint.
    #[arrrg(optional, "Contact relay URL (default: $SITEBOT_CONTACT_URL)", "URL")]
    pub contact_url: Option<String>,

    /// Sender's name.
    #[arrrg(optional, "Your name", "NAME")]
    pub name: Option<String>,

    /// Sender's email address.
    #[arrrg(optional, "Your email address", "EMAIL")]
    pub email: Option<String>,

    /// Transport timeout in seconds.
    #[arrrg(optional, "Request timeout in seconds (default: 30)", "SECONDS")]
    pub timeout: Option<u64>,
}

impl ContactArgs {
    /// The relay endpoint from the arguments or the environment.
    pub fn resolved_contact_url(&self) -> Option<String> {
        self.contact_url
            .clone()
            .or_else(|| env::var(CONTACT_URL_ENV).ok())
    }

    /// The transport timeout from the arguments, or the default.
    pub fn resolved_timeout(&self) -> Duration {
        self.timeout
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }
}
