//! Error types for export archive operations.

use thiserror::Error;

/// Errors that can occur while writing or reading an export archive.
#[derive(Error, Debug)]
pub enum ExportError {
    /// I/O error while building or reading the tar/gzip stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error for `session.json`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required file was absent when decoding an archive.
    #[error("missing required file: {0}")]
    MissingFile(String),

    /// `session.json` did not parse into the expected manifest shape.
    #[error("corrupted manifest: {0}")]
    CorruptedManifest(String),

    /// An unsupported schema version was found in `session.json.metadata`.
    #[error("unsupported manifest version: {version} (supported: {supported})")]
    UnsupportedVersion { version: u32, supported: u32 },
}

/// Result type alias for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;
