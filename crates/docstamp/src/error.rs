use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for header generation operations.
pub type Result<T> = std::result::Result<T, DocError>;

/// Error variants surfaced by the generation engine.
///
/// Generative description failures never show up here: they degrade to empty
/// placeholders inside the description strategies. Cancellation and failed
/// edit application are reported through [`crate::Outcome`] instead.
#[derive(Debug, Error)]
pub enum DocError {
    /// The file's language is not one the parser understands.
    #[error("unsupported file type '{path}'")]
    UnsupportedScope {
        /// Path of the rejected file.
        path: PathBuf,
    },

    /// No declaration at the requested position and no file-level fallback.
    #[error("no documentable declaration at {path}:{line}:{column}")]
    UnsupportedPosition {
        /// File the position refers to.
        path: PathBuf,
        /// One-based line.
        line: u32,
        /// One-based column.
        column: u32,
    },

    /// Failed to read or access a source file.
    #[error("failed to read source '{path}': {error}")]
    Io {
        /// Path to the source file that caused the error.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        error: std::io::Error,
    },

    /// Parsing the source file with OXC failed.
    #[error("failed to parse source '{path}': {message}")]
    Parse {
        /// Path to the source file.
        path: PathBuf,
        /// Aggregated parser error message.
        message: String,
    },

    /// The configuration holds values the generator cannot honour.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Human-readable description of the problem.
        message: String,
    },
}

impl DocError {
    /// Helper to create a parse error from multiple diagnostic strings.
    pub fn parse_error(path: PathBuf, diagnostics: &[String]) -> Self {
        let message = diagnostics.join("; ");
        Self::Parse { path, message }
    }

    /// Helper to create a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
