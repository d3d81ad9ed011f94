//! Common error types for rdial

use thiserror::Error;

/// Common result type for rdial operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across rdial crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML document could not be parsed into the expected schema
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input (command-line value, range string, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
