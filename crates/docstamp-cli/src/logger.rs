//! Logging setup for the docstamp CLI.
//!
//! Log lines go to stderr through `tracing-subscriber`, leaving stdout to
//! `--dry-run` output.
//!
//! The level is picked in this order:
//! 1. `--verbose`: DEBUG for docstamp crates
//! 2. `--quiet`: ERROR only
//! 3. `RUST_LOG`
//! 4. WARN for docstamp crates
//!
//! The default is WARN because user-facing progress is printed by [`crate::ui`].

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "docstamp=debug,docstamp_cli=debug";
const QUIET_FILTER: &str = "docstamp=error,docstamp_cli=error";
const DEFAULT_FILTER: &str = "docstamp=warn,docstamp_cli=warn";

/// Initialize the tracing subscriber. Call once, before any logging.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let filter = if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color && crate::ui::should_use_color())
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
