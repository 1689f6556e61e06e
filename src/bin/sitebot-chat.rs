//! Interactive terminal stand-in for the site's chat widget.
//!
//! # Usage
//!
//! ```bash
//! # Talk to a local gateway
//! sitebot-chat
//!
//! # Point at a deployed gateway and browse a project listing
//! sitebot-chat --chat-url https://chat.example.org/chat --projects projects.json
//!
//! # Disable colors (useful for piping output)
//! sitebot-chat --no-color
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/history` - Show the history sent to the gateway
//! - `/projects [category]` - Browse the project gallery
//! - `/stats` - Show session statistics
//! - `/quit` - Exit the application

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

use sitebot::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatSession, PlainTextRenderer, Renderer, SendOutcome,
    help_text, parse_command,
};
use sitebot::{Gateway, ProjectCatalog};

/// Main entry point for the sitebot-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let (args, _) = ChatArgs::from_command_line_relaxed("sitebot-chat [OPTIONS]");
    let config = ChatConfig::from(args);
    let use_color = config.use_color;

    let catalog = match config.projects.as_deref() {
        Some(source) => Some(ProjectCatalog::open(source, Some(config.timeout)).await?),
        None => None,
    };

    let session = ChatSession::new(config)?;
    let mut renderer = PlainTextRenderer::with_color(use_color);
    let mut rl = DefaultEditor::new()?;

    println!("Site assistant (gateway: {})", session.config().chat_url);
    println!("Type /help for commands, /quit to exit\n");
    session.open();
    for message in session.messages() {
        renderer.print_message(&message);
    }

    loop {
        let readline = rl.readline("You: ");

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                // Check for slash commands
                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Open => {
                            session.open();
                            renderer.print_info("Chat opened.");
                            for message in session.messages() {
                                renderer.print_message(&message);
                            }
                        }
                        ChatCommand::Close => {
                            session.close();
                            renderer.print_info("Chat closed. /open to continue.");
                        }
                        ChatCommand::Session => match session.session_id() {
                            Some(id) => renderer.print_info(&format!("Session: {id}")),
                            None => renderer.print_info("No session yet."),
                        },
                        ChatCommand::History => print_history(&session),
                        ChatCommand::Projects(category) => {
                            with_catalog(&catalog, &mut renderer, |catalog, renderer| {
                                let projects = catalog.filter(category.as_deref());
                                if projects.is_empty() {
                                    renderer.print_info("No projects match.");
                                }
                                for project in projects {
                                    renderer.print_info(&format!(
                                        "  {:<20} {} [{}]",
                                        project.id, project.topic, project.category
                                    ));
                                }
                            })
                        }
                        ChatCommand::Categories => {
                            with_catalog(&catalog, &mut renderer, |catalog, renderer| {
                                renderer.print_info("  All");
                                for category in catalog.categories() {
                                    renderer.print_info(&format!("  {category}"));
                                }
                            })
                        }
                        ChatCommand::Project(id) => {
                            with_catalog(&catalog, &mut renderer, |catalog, renderer| {
                                match catalog.get(&id) {
                                    Some(project) => renderer.print_project(project),
                                    None => renderer.print_error(&format!("No project '{id}'")),
                                }
                            })
                        }
                        ChatCommand::SaveTranscript(path) => {
                            match session.save_transcript_to(&path) {
                                Ok(_) => {
                                    renderer.print_info(&format!("Transcript saved to {}", path))
                                }
                                Err(err) => renderer
                                    .print_error(&format!("Failed to save transcript: {}", err)),
                            }
                        }
                        ChatCommand::Stats => print_stats(&session),
                        ChatCommand::Invalid(message) => {
                            renderer.print_error(&message);
                        }
                    }
                    continue;
                }

                if !session.is_open() {
                    renderer.print_info("The chat is closed. /open to start talking.");
                    continue;
                }

                // Regular message - send to the gateway
                renderer.print_pending();
                match session.send(line).await {
                    Ok(SendOutcome::Replied(reply)) => renderer.print_message(&reply),
                    Ok(SendOutcome::Busy) => {
                        renderer.print_info("Still waiting for the previous reply.")
                    }
                    Err(e) => renderer.print_error(&e.to_string()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

fn with_catalog<F>(catalog: &Option<ProjectCatalog>, renderer: &mut PlainTextRenderer, f: F)
where
    F: FnOnce(&ProjectCatalog, &mut PlainTextRenderer),
{
    match catalog {
        Some(catalog) => f(catalog, renderer),
        None => renderer.print_error("No project listing configured (use --projects)."),
    }
}

fn print_history(session: &ChatSession<Gateway>) {
    let history = session.history();
    if history.is_empty() {
        println!("    (no exchanges yet)");
        return;
    }
    for (idx, pair) in history.iter().enumerate() {
        println!("    {}. Q: {}", idx + 1, pair.question());
        if pair.is_open() {
            println!("       A: (pending)");
        } else {
            println!("       A: {}", pair.answer());
        }
    }
}

fn print_stats(session: &ChatSession<Gateway>) {
    let stats = session.stats();
    println!("    Session Statistics:");
    match stats.session_id {
        Some(ref id) => println!("      Session: {id}"),
        None => println!("      Session: (not started)"),
    }
    println!(
        "      Widget: {}",
        if stats.is_open { "open" } else { "closed" }
    );
    println!("      Gateway: {}", stats.chat_url);
    println!("      Messages: {}", stats.message_count);
    println!("      Exchanges: {}", stats.exchanges);
    println!(
        "      Requests: {} ({} answered with fallback)",
        stats.total_requests, stats.fallbacks
    );
}
