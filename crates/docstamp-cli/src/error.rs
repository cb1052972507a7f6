//! Error handling for the docstamp CLI.
//!
//! [`CliError`] is what commands return. Engine errors convert through
//! `#[from]` and keep their message; configuration problems carry a hint for
//! the user. `main` turns the final error into a miette report with
//! [`cli_error_to_miette`].

use std::path::PathBuf;

use docstamp::DocError;
use miette::Report;
use thiserror::Error;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration loading or validation failed
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The generation engine rejected the request
    #[error(transparent)]
    Doc(#[from] DocError),

    /// Invalid command-line arguments or options
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// File or directory not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The generated headers could not be written
    #[error("Failed to write {count} generated header(s)")]
    InsertionFailed { count: usize },

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Explicitly requested config file doesn't exist
    #[error("Config file not found: {}\n\nHint: Create a docstamp.json file or fix the --config path", .0.display())]
    NotFound(PathBuf),

    /// A layer could not be merged or a value has the wrong shape
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The invalid value
        value: String,
        /// Helpful hint for correct values
        hint: String,
    },

    /// The merged configuration fails validation
    #[error("{message}\n\nHint: Check docstamp.json, DOCSTAMP_* variables and command-line overrides")]
    Invalid { message: String },
}

/// Result type alias for CLI operations.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Doc(DocError::UnsupportedPosition { path, line, column }) => miette::miette!(
            "No documentable declaration at {}:{line}:{column}\n\nHint: Place the cursor on a declaration name or at the start of the file",
            path.display()
        ),
        CliError::Doc(DocError::UnsupportedScope { path }) => miette::miette!(
            "Unsupported file type: {}\n\nHint: Only .js, .jsx, .mjs, .cjs, .ts, .tsx, .mts and .cts files can be documented",
            path.display()
        ),
        CliError::Doc(DocError::Parse { path, message }) => miette::miette!(
            "Failed to parse {}: {message}\n\nHint: Fix the syntax errors and run again",
            path.display()
        ),
        CliError::Config(e) => miette::miette!("Configuration error: {}", e),
        _ => miette::miette!("{}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_mentions_the_path() {
        let err = CliError::from(ConfigError::NotFound(PathBuf::from("custom.json")));
        let message = err.to_string();
        assert!(message.contains("custom.json"));
        assert!(message.contains("Hint:"));
    }

    #[test]
    fn doc_errors_keep_their_message() {
        let err = CliError::from(DocError::invalid_config("fileGlob cannot be empty"));
        assert_eq!(err.to_string(), "invalid configuration: fileGlob cannot be empty");
    }

    #[test]
    fn unsupported_position_gets_a_hint() {
        let report = cli_error_to_miette(CliError::Doc(DocError::UnsupportedPosition {
            path: PathBuf::from("a.ts"),
            line: 2,
            column: 7,
        }));
        let message = report.to_string();
        assert!(message.contains("a.ts:2:7"));
        assert!(message.contains("Hint:"));
    }
}
