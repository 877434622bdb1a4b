//! Error types for selector and server operations.

use thiserror::Error;

/// Errors surfaced by selector and server operations.
#[derive(Debug, Error)]
pub enum SelectorError {
    /// A server group must contain at least one server.
    #[error("server group must contain at least one server")]
    EmptyGroup,

    /// A server could not be resolved to a connection descriptor.
    #[error("resolution failed: {0}")]
    Resolution(String),

    /// Transport-level I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SelectorError>;
