//! Command implementations.
//!
//! All subcommands share one pipeline in [`generate`]: load the
//! configuration, pick a description strategy, run the orchestrator over the
//! requested scope and report the outcome.

pub mod generate;

pub use generate::{execute as generate_execute, scope_for};
