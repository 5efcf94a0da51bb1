//! Error types for survey settlement

use thiserror::Error;

/// Result type for settlement operations
pub type Result<T> = std::result::Result<T, Error>;

/// Settlement errors
#[derive(Error, Debug)]
pub enum Error {
    /// Rejected input (zero reward, negative or non-finite amounts)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Arithmetic left the representable decimal range
    #[error("Calculation error: {0}")]
    Calculation(String),

    /// Operation not allowed in the current request state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Metrics registration error
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the caller supplied bad data, as opposed to an internal failure
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }
}
