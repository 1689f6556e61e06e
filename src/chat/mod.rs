//! Chat widget module for conversations with the site's assistant.
//!
//! This module provides the per-widget controller and the pieces the terminal
//! front end needs around it:
//!
//! - Lazily started sessions with a fixed greeting
//! - At most one outstanding gateway call per widget
//! - Fallback replies when the gateway fails
//! - Slash commands for widget control and gallery browsing
//!
//! # Architecture
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: Widget state, conversation log and gateway interaction
//! - [`commands`]: Slash command parsing and handling

mod commands;
mod config;
mod session;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{
    CHAT_URL_ENV, CONTACT_URL_ENV, ChatArgs, ChatConfig, ContactArgs, PROJECTS_ENV,
};
pub use session::{ChatSession, SendOutcome, SessionStats};
