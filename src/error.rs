//! Error types shared by the counter core.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CounterError>;

#[derive(Debug, Error)]
pub enum CounterError {
    /// The key-value backend refused a read or write (quota, private mode, ...).
    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("import rejected: {0}")]
    Import(#[from] ImportError),
}

/// Why an imported blob was refused. State is never touched in either case.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("not valid export data: {0}")]
    Malformed(String),

    #[error("missing `{0}` record")]
    MissingRecord(&'static str),
}

/// Failure inside a haptics or audio backend. Never surfaced past the adapter.
#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("{0} is not supported on this device")]
    Unsupported(&'static str),

    #[error("playback failed: {0}")]
    Playback(String),
}
