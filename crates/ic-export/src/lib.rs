//! Export codec (C9): serializes a persisted session into a self-describing
//! gzip+tar archive, and reads one back.
//!
//! The archive is a plain gzip-compressed ustar tarball with no encryption
//! and no per-file checksum manifest: `README.md`, `session.json`,
//! `code.txt`, `invariants.txt`, and an optional `audio.<ext>`.

pub mod archive;
pub mod error;
pub mod filename;
pub mod manifest;

pub use archive::{read_archive, write_archive, ExportedBundle};
pub use error::{ExportError, Result};
pub use filename::{download_filename, problem_slug};
pub use manifest::{ExportMetadata, ExportProblem, ExportTiming, SessionManifest, MANIFEST_VERSION};
