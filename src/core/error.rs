//! Error types for velo-route
//!
//! Library code returns [`Error`]; the binary wraps it with `anyhow` context.
//! Outcomes that are ordinary "not found" answers (no node near a point,
//! unreachable destination) are `Option`s, not errors.

use std::path::PathBuf;

/// Main error type for velo-route operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A graph file could not be opened or mapped
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Graph data is inconsistent; the graph must not be used
    #[error("Corrupt graph data: {0}")]
    Corrupt(String),

    /// Invalid parameters passed to an operation
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration file could not be parsed
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Report serialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        Error::Corrupt(msg.into())
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }
}

/// Convenience result type for velo-route operations
pub type Result<T> = std::result::Result<T, Error>;
