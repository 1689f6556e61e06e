//! Submit the site's contact form from the command line.
//!
//! # Usage
//!
//! ```bash
//! sitebot-contact --contact-url https://relay.example.org/f/abc \
//!     --name "Ada" --email ada@example.org "Hello! Can we visit?"
//! ```
//!
//! The message is taken from the free arguments, or from stdin when none are
//! given.

use std::io::{self, Read};

use arrrg::CommandLine;
use tracing_subscriber::EnvFilter;

use sitebot::chat::{CONTACT_URL_ENV, ContactArgs};
use sitebot::{ContactRelay, ContactSubmission};

/// Main entry point for the sitebot-contact application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let (args, free) = ContactArgs::from_command_line_relaxed(
        "sitebot-contact [OPTIONS] --name NAME --email EMAIL [MESSAGE]...",
    );

    let Some(endpoint) = args.resolved_contact_url() else {
        eprintln!("no contact relay configured; pass --contact-url or set {CONTACT_URL_ENV}");
        std::process::exit(2);
    };

    let message = if free.is_empty() {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        free.join(" ")
    };

    let submission = ContactSubmission::new(
        args.name.as_deref().unwrap_or_default(),
        args.email.as_deref().unwrap_or_default(),
        message,
    );
    let relay = ContactRelay::with_options(&endpoint, Some(args.resolved_timeout()))?;
    match relay.submit(&submission).await {
        Ok(()) => {
            println!("Thank you! Your message has been sent successfully.");
            Ok(())
        }
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}
