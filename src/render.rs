//! Output rendering for the terminal chat.
//!
//! Bot answers may carry light markup: `**bold**`, `#`-headings and `-`/`*`
//! bullet lists.  [`format_markup`] turns that into terminal text, with ANSI
//! styling when color is enabled and plain text otherwise.

use std::io::{self, Stdout, Write};

use crate::types::{Message, Project, Sender};

/// ANSI escape code for bold text.
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code for dim text (used for the pending indicator).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for the bot label and headings).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// Trait for rendering chat output.
pub trait Renderer: Send {
    /// Print one conversation message.
    fn print_message(&mut self, message: &Message);

    /// Show that a reply is on its way.
    fn print_pending(&mut self);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Print a project from the gallery in detail.
    fn print_project(&mut self, project: &Project);
}

/// Renderer that writes to stdout, optionally with ANSI styling.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
}

impl PlainTextRenderer {
    /// Create a renderer with ANSI styling enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Create a renderer with ANSI styling enabled or disabled.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
        }
    }

    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn print_message(&mut self, message: &Message) {
        println!("{}", format_message(message, self.use_color));
        self.flush();
    }

    fn print_pending(&mut self) {
        if self.use_color {
            println!("{ANSI_DIM}...{ANSI_RESET}");
        } else {
            println!("...");
        }
        self.flush();
    }

    fn print_error(&mut self, error: &str) {
        if self.use_color {
            eprintln!("{ANSI_RED}Error: {error}{ANSI_RESET}");
        } else {
            eprintln!("Error: {error}");
        }
    }

    fn print_info(&mut self, info: &str) {
        println!("{info}");
        self.flush();
    }

    fn print_project(&mut self, project: &Project) {
        println!("{}", format_project(project, self.use_color));
        self.flush();
    }
}

/// Format a message with a sender label.
pub fn format_message(message: &Message, use_color: bool) -> String {
    match message.sender() {
        Sender::User => format!("You: {}", message.text()),
        Sender::Bot => {
            let label = if use_color {
                format!("{ANSI_CYAN}Bot:{ANSI_RESET}")
            } else {
                "Bot:".to_string()
            };
            let body = format_markup(message.text(), use_color);
            if body.contains('\n') {
                format!("{label}\n{body}")
            } else {
                format!("{label} {body}")
            }
        }
    }
}

/// Format a project for the detail view.
pub fn format_project(project: &Project, use_color: bool) -> String {
    let mut out = String::new();
    if use_color {
        out.push_str(&format!("{ANSI_BOLD}{}{ANSI_RESET}", project.topic));
    } else {
        out.push_str(&project.topic);
    }
    out.push_str(&format!(" [{}] ({})\n", project.category, project.id));
    if !project.tags.is_empty() {
        out.push_str(&format!("  tags: {}\n", project.tags.join(", ")));
    }
    out.push_str(&format!("  {}\n", project.description()));
    out.push_str(&format!("  video: {}", project.video_url));
    if let Some(github) = &project.links.github {
        out.push_str(&format!("\n  github: {github}"));
    }
    if let Some(document) = &project.links.document {
        out.push_str(&format!("\n  document: {document}"));
    }
    out
}

/// Render light markup line by line.
pub fn format_markup(text: &str, use_color: bool) -> String {
    text.lines()
        .map(|line| format_line(line, use_color))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_line(line: &str, use_color: bool) -> String {
    let trimmed = line.trim_start();
    let heading = trimmed.trim_start_matches('#');
    if heading.len() < trimmed.len() && heading.starts_with(' ') {
        let heading = strip_bold(heading.trim());
        return if use_color {
            format!("{ANSI_BOLD}{ANSI_CYAN}{heading}{ANSI_RESET}")
        } else {
            heading.to_uppercase()
        };
    }
    let (prefix, body) = match trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
    {
        Some(item) => ("  • ", item),
        None => ("", line),
    };
    let body = if use_color {
        bold_to_ansi(body)
    } else {
        strip_bold(body)
    };
    format!("{prefix}{body}")
}

fn strip_bold(text: &str) -> String {
    text.replace("**", "")
}

fn bold_to_ansi(text: &str) -> String {
    let mut out = String::new();
    let mut bold = false;
    let mut pieces = text.split("**").peekable();
    while let Some(piece) = pieces.next() {
        out.push_str(piece);
        if pieces.peek().is_some() {
            out.push_str(if bold { ANSI_RESET } else { ANSI_BOLD });
            bold = !bold;
        }
    }
    if bold {
        out.push_str(ANSI_RESET);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renderer_default_has_color() {
        let renderer = PlainTextRenderer::new();
        assert!(renderer.use_color);
    }

    #[test]
    fn renderer_without_color() {
        let renderer = PlainTextRenderer::with_color(false);
        assert!(!renderer.use_color);
    }

    #[test]
    fn plain_markup() {
        let text = "## Projects\nWe build **robots**.\n- arms\n* line followers";
        assert_eq!(
            format_markup(text, false),
            "PROJECTS\nWe build robots.\n  • arms\n  • line followers"
        );
    }

    #[test]
    fn ansi_bold() {
        assert_eq!(
            format_markup("a **b** c", true),
            format!("a {ANSI_BOLD}b{ANSI_RESET} c")
        );
        // An unterminated marker still resets.
        assert_eq!(
            format_markup("**open", true),
            format!("{ANSI_BOLD}open{ANSI_RESET}")
        );
    }

    #[test]
    fn hashtags_are_not_headings() {
        assert_eq!(format_markup("#rustlang rocks", false), "#rustlang rocks");
    }

    #[test]
    fn message_labels() {
        assert_eq!(format_message(&Message::user("hi"), false), "You: hi");
        assert_eq!(format_message(&Message::bot("hello"), false), "Bot: hello");
        assert_eq!(
            format_message(&Message::bot("# Hi\nthere"), false),
            "Bot:\nHI\nthere"
        );
    }
}
