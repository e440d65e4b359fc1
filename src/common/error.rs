//! Error types for the SIMPL test harness
//!
//! Only problems that prevent a run from starting (bad arguments, broken
//! configuration) or that break the operator console surface here. Anything
//! that goes wrong while a single test case runs is folded into that case's
//! verdict instead.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the test harness
#[derive(Error, Debug)]
pub enum Error {
    // === Invocation Errors ===
    #[error("Unsupported test suite '{0}'. The available options are: scanner, parser, typecheck")]
    InvalidSuite(String),

    #[error("Expected exactly one test suite argument, got {0}. The available options are: scanner, parser, typecheck")]
    InvalidArity(usize),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === Process Errors ===
    #[error("Failed to run '{program}': {error}")]
    Spawn { program: String, error: String },

    // === IO Errors ===
    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    #[error("Failed to write file '{path}': {error}")]
    FileWrite { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Console Errors ===
    #[error("Operator console failed: {0}")]
    Console(String),
}

impl Error {
    /// Create a spawn error for a program that could not be started
    pub fn spawn(program: &std::path::Path, error: &io::Error) -> Self {
        Self::Spawn {
            program: program.display().to_string(),
            error: error.to_string(),
        }
    }

    /// Create a file read error
    pub fn file_read(path: &std::path::Path, error: &io::Error) -> Self {
        Self::FileRead {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }

    /// Create a file write error
    pub fn file_write(path: &std::path::Path, error: &io::Error) -> Self {
        Self::FileWrite {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }

    /// Whether this error means the invocation itself was wrong and only the
    /// usage text should be shown
    pub fn is_usage(&self) -> bool {
        matches!(self, Error::InvalidSuite(_) | Error::InvalidArity(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_errors() {
        assert!(Error::InvalidSuite("lexer".into()).is_usage());
        assert!(Error::InvalidArity(2).is_usage());
        assert!(!Error::Config("bad".into()).is_usage());
    }

    #[test]
    fn test_spawn_error_names_program() {
        let err = Error::spawn(
            std::path::Path::new("../bin/simplc"),
            &io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
        );
        let msg = err.to_string();
        assert!(msg.contains("../bin/simplc"));
        assert!(msg.contains("No such file"));
    }
}
