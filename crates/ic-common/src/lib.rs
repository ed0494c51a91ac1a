//! Interview Conditioning common types, IDs, and errors.
//!
//! Foundational types shared across the engine, config, export, and stats
//! crates:
//! - Session identity
//! - Schema versioning
//! - A shared error type for storage/lookup failures

pub mod error;
pub mod id;
pub mod schema;

pub use error::{Error, Result};
pub use id::SessionId;
pub use schema::SCHEMA_VERSION;
