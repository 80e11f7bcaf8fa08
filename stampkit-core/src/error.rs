//! Error types for stampkit-core

use thiserror::Error;

pub use crate::format::FormatError;

/// Main error type for the stampkit-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Timestamp pattern could not be compiled
    #[error(transparent)]
    Format(#[from] FormatError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// No text command with this name
    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

/// Result type alias for stampkit-core
pub type Result<T> = std::result::Result<T, Error>;
