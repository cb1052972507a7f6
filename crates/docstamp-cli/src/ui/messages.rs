//! Status message functions for terminal output.
//!
//! Colors honour the override set by [`super::init_colors`].

use owo_colors::{OwoColorize, Stream::Stderr};

/// Print a success message to stderr.
///
/// # Examples
///
/// ```no_run
/// use docstamp_cli::ui::success;
///
/// success("Generated 3 headers");
/// ```
pub fn success(message: &str) {
    eprintln!(
        "{} {}",
        "✓".if_supports_color(Stderr, |s| s.green().bold().to_string()),
        message
    );
}

/// Print an info message to stderr.
pub fn info(message: &str) {
    eprintln!(
        "{} {}",
        "ℹ".if_supports_color(Stderr, |s| s.blue().bold().to_string()),
        message
    );
}

/// Print a warning message to stderr.
pub fn warning(message: &str) {
    eprintln!(
        "{} {}",
        "⚠".if_supports_color(Stderr, |s| s.yellow().bold().to_string()),
        message.if_supports_color(Stderr, |s| s.yellow())
    );
}

/// Print an error message to stderr.
pub fn error(message: &str) {
    eprintln!(
        "{} {}",
        "✗".if_supports_color(Stderr, |s| s.red().bold().to_string()),
        message.if_supports_color(Stderr, |s| s.red())
    );
}
