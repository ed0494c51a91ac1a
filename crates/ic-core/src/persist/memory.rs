//! In-memory [`Store`] implementation, for tests and short-lived embeddings.

use std::collections::HashMap;

use ic_common::{Result, SessionId};

use super::{AudioRecord, SessionRecord, Store, StoreStats};

/// A `HashMap`-backed store. Nothing here ever touches disk; state is lost
/// when the value is dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: HashMap<String, SessionRecord>,
    audio: HashMap<String, AudioRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn put_session(&mut self, record: SessionRecord) -> Result<()> {
        self.sessions.insert(record.id.as_str().to_string(), record);
        Ok(())
    }

    fn get_session(&self, id: &SessionId) -> Result<Option<SessionRecord>> {
        Ok(self.sessions.get(id.as_str()).cloned())
    }

    fn get_all_sessions(&self) -> Result<Vec<SessionRecord>> {
        let mut records: Vec<SessionRecord> = self
            .sessions
            .values()
            .filter(|r| !r.is_soft_deleted())
            .cloned()
            .collect();
        records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(records)
    }

    fn soft_delete_session(&mut self, id: &SessionId) -> Result<()> {
        if let Some(record) = self.sessions.get_mut(id.as_str()) {
            record.deleted_at = Some(record.updated_at);
        }
        Ok(())
    }

    fn get_incomplete_session(&self) -> Result<Option<SessionRecord>> {
        let mut candidates: Vec<&SessionRecord> = self
            .sessions
            .values()
            .filter(|r| r.looks_in_progress())
            .collect();
        candidates.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(candidates.first().map(|r| (*r).clone()))
    }

    fn save_audio_chunk(&mut self, session_id: &SessionId, blob: Vec<u8>, mime_type: &str) -> Result<()> {
        let entry = self
            .audio
            .entry(session_id.as_str().to_string())
            .or_insert_with(|| AudioRecord {
                session_id: session_id.clone(),
                chunks: Vec::new(),
                mime_type: mime_type.to_string(),
            });
        entry.chunks.push(blob);
        entry.mime_type = mime_type.to_string();
        Ok(())
    }

    fn get_audio(&self, session_id: &SessionId) -> Result<Option<AudioRecord>> {
        Ok(self.audio.get(session_id.as_str()).cloned())
    }

    fn delete_audio(&mut self, session_id: &SessionId) -> Result<()> {
        self.audio.remove(session_id.as_str());
        Ok(())
    }

    fn list_audio_session_ids(&self) -> Result<Vec<SessionId>> {
        Ok(self.audio.values().map(|r| r.session_id.clone()).collect())
    }

    fn get_stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            session_count: self.sessions.values().filter(|r| !r.is_soft_deleted()).count(),
            audio_count: self.audio.len(),
        })
    }

    fn clear_all(&mut self) -> Result<()> {
        self.sessions.clear();
        self.audio.clear();
        Ok(())
    }
}
