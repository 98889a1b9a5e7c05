use std::io;

use thiserror::Error;

/// Errors produced while turning a backup archive into workout data.
#[derive(Debug, Error)]
pub enum Error {
    /// A structural expectation of the archive layout was violated.
    #[error("malformed archive: {0}")]
    Format(String),
    /// The archive uses a value this crate recognizes but does not handle.
    #[error("unsupported archive: {0}")]
    UnsupportedFormat(String),
    /// Password verifier or authentication code mismatch.
    #[error("wrong password or corrupted archive: {0}")]
    Authentication(&'static str),
    #[error("failed to inflate entry: {0}")]
    Decompression(#[source] io::Error),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("state error: {0}")]
    State(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    pub(crate) fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedFormat(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
