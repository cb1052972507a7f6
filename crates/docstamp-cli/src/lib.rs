//! docstamp command-line front end.
//!
//! The binary in `main.rs` is a thin wrapper; argument parsing, configuration
//! layering and command execution live here so integration tests can drive
//! them directly.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod ui;
