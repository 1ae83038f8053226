//! Output rendering for the chat surface.
//!
//! This module provides a trait-based rendering abstraction the session
//! controller reports through while a turn is streaming: text chunks as
//! they arrive, status transitions, citation sources, and errors.

use std::io::{self, Stdout, Write};

use crate::types::{SessionStatus, Source};

/// ANSI escape code for dim text (used for status lines).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for italic text (used for status lines).
const ANSI_ITALIC: &str = "\x1b[3m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for source listings).
const ANSI_CYAN: &str = "\x1b[36m";

/// Trait for rendering chat output.
///
/// This abstraction allows for different rendering strategies: plain
/// text with ANSI styling, plain text for piping, or a TUI.
pub trait Renderer: Send {
    /// Print a chunk of response text.
    ///
    /// This is called incrementally as chunks are streamed from the
    /// backend.
    fn print_text(&mut self, text: &str);

    /// Print a status transition (thinking, retrieving, ...).
    fn print_status(&mut self, status: &SessionStatus);

    /// Print the citation sources for the current turn.
    ///
    /// Each call replaces whatever sources were shown before.
    fn print_sources(&mut self, sources: &[Source]);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Called when a turn is complete.
    ///
    /// Used to ensure proper newlines and cleanup after streaming.
    fn finish_response(&mut self);

    /// Called when the stream is interrupted by the user.
    fn print_interrupted(&mut self);
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            use_color: true,
        }
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
        }
    }

    /// Flushes stdout to ensure immediate display of streamed content.
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
    fn print_text(&mut self, text: &str) {
        print!("{text}");
        self.flush();
    }

    fn print_status(&mut self, status: &SessionStatus) {
        if self.use_color {
            println!("{ANSI_DIM}{ANSI_ITALIC}[{status}]{ANSI_RESET}");
        } else {
            println!("[{status}]");
        }
        self.flush();
    }

    fn print_sources(&mut self, sources: &[Source]) {
        if sources.is_empty() {
            return;
        }
        for source in sources {
            let excerpt = source.excerpt(150);
            if self.use_color {
                print!("{ANSI_CYAN}");
            }
            match &source.url {
                Some(url) => println!("  - {} <{}>", source.title, url),
                None => println!("  - {}", source.title),
            }
            if self.use_color {
                print!("{ANSI_RESET}");
            }
            if !excerpt.is_empty() {
                println!("    {excerpt}");
            }
        }
        self.flush();
    }

    fn print_error(&mut self, error: &str) {
        eprintln!("\nError: {error}");
    }

    fn print_info(&mut self, info: &str) {
        println!("{info}");
    }

    fn finish_response(&mut self) {
        println!();
        self.flush();
    }

    fn print_interrupted(&mut self) {
        println!("\n[interrupted]");
        self.flush();
    }
}
