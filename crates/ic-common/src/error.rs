//! Shared error type for Interview Conditioning crates.

use thiserror::Error;

/// Result type alias using the shared [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors shared across the engine, persistence, and export crates.
///
/// Grouped into numbered bands so a host can render a stable error code
/// alongside the message, independent of locale or wording changes.
#[derive(Error, Debug)]
pub enum Error {
    // Session lookup errors (10-19)
    #[error("session not found: {session_id}")]
    SessionNotFound { session_id: String },

    #[error("session corrupted: {0}")]
    SessionCorrupted(String),

    #[error("audio record not found for session: {session_id}")]
    AudioNotFound { session_id: String },

    // I/O errors (20-29)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Storage location errors (30-39)
    #[error("could not resolve a data directory for local storage")]
    NoDataDir,
}

impl Error {
    /// Returns the numeric error code for this error, used in structured
    /// diagnostics where a stable identifier matters more than wording.
    pub fn code(&self) -> u32 {
        match self {
            Error::SessionNotFound { .. } => 10,
            Error::SessionCorrupted(_) => 11,
            Error::AudioNotFound { .. } => 12,
            Error::Io(_) => 20,
            Error::Json(_) => 21,
            Error::NoDataDir => 30,
        }
    }
}
