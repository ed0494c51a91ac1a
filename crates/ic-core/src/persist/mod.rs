//! Persistence adapter (C7): a durable key/value-like store for session
//! records and opaque audio blobs, behind a trait so a host can substitute
//! IndexedDB, SQLite, or anything else without touching the engine.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use ic_common::{Result, SessionId};
use ic_config::{PresetName, Problem};
use serde::{Deserialize, Serialize};

use crate::event_log::EventLog;

/// A persisted session: the event log plus the metadata needed to list and
/// restore it without folding the log first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: SessionId,
    pub problem: Problem,
    pub preset: PresetName,
    pub events: EventLog,
    #[serde(rename = "createdAt")]
    pub created_at: i64,
    #[serde(rename = "updatedAt")]
    pub updated_at: i64,
    #[serde(rename = "deletedAt")]
    pub deleted_at: Option<i64>,
}

impl SessionRecord {
    pub fn is_soft_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// A session is "in progress" if its derived status is `in_progress` —
    /// cheaper to approximate here as "not completed and not abandoned" by
    /// checking for the terminal events, so callers don't need a preset to
    /// fold the full derived state just to find the incomplete session.
    pub fn looks_in_progress(&self) -> bool {
        !self.is_soft_deleted()
            && !self.events.as_slice().iter().any(|e| {
                matches!(
                    e.kind,
                    crate::event::EventKind::SessionCompleted
                        | crate::event::EventKind::SessionAbandoned
                )
            })
    }
}

/// An opaque audio recording attached to a session. The core never
/// interprets chunk contents — only existence and count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioRecord {
    #[serde(rename = "sessionId")]
    pub session_id: SessionId,
    pub chunks: Vec<Vec<u8>>,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
}

/// Aggregate counters the UI can show without walking every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    #[serde(rename = "sessionCount")]
    pub session_count: usize,
    #[serde(rename = "audioCount")]
    pub audio_count: usize,
}

/// Durable store contract (C7). Every operation is idempotent: calling it
/// twice with the same input leaves the store in the same observable state
/// as calling it once.
pub trait Store {
    fn put_session(&mut self, record: SessionRecord) -> Result<()>;
    fn get_session(&self, id: &SessionId) -> Result<Option<SessionRecord>>;
    /// Non-soft-deleted records, ordered by `updated_at` descending.
    fn get_all_sessions(&self) -> Result<Vec<SessionRecord>>;
    fn soft_delete_session(&mut self, id: &SessionId) -> Result<()>;
    /// The most recent non-soft-deleted record that still looks in
    /// progress, or `None`.
    fn get_incomplete_session(&self) -> Result<Option<SessionRecord>>;

    fn save_audio_chunk(&mut self, session_id: &SessionId, blob: Vec<u8>, mime_type: &str) -> Result<()>;
    fn get_audio(&self, session_id: &SessionId) -> Result<Option<AudioRecord>>;
    fn delete_audio(&mut self, session_id: &SessionId) -> Result<()>;
    /// Every session id that has an audio record, regardless of whether
    /// the owning session still exists. Used by startup cleanup to find
    /// audio left behind by sessions that are no longer in progress.
    fn list_audio_session_ids(&self) -> Result<Vec<SessionId>>;

    fn get_stats(&self) -> Result<StoreStats>;
    fn clear_all(&mut self) -> Result<()>;
}
