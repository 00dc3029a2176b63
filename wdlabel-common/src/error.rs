//! Common error types for wdlabel

use thiserror::Error;

/// Common result type for wdlabel operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the wdlabel crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML configuration could not be parsed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Malformed line in a triple dump or dataset file
    #[error("Parse error in {source_name} at line {line}: {message}")]
    Parse {
        source_name: String,
        line: usize,
        message: String,
    },

    /// Stage inputs that are not materialized
    #[error("Missing dataset(s): {0}")]
    MissingDataset(String),

    /// Invalid user input or argument
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Build a parse error for `line` (1-based) of `source_name`
    pub fn parse(source_name: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            source_name: source_name.into(),
            line,
            message: message.into(),
        }
    }
}
