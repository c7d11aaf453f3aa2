//! Common error types for the gesture workspace

use thiserror::Error;

/// Common result type for gesture operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the gesture crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML document could not be parsed
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input value (unparseable axis selector, bad log level, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
