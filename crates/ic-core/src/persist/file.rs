//! Filesystem-backed [`Store`] implementation.
//!
//! One JSON file per session under `<data_dir>/interview-conditioning/
//! sessions/<id>.json`; audio chunks under `.../audio/<id>/<n>.bin` plus a
//! `meta.json` sidecar recording the mime type and chunk count. Writes are
//! atomic: serialize to a temp file in the same directory, then `rename`
//! over the destination, so a crash mid-write can never leave a corrupted
//! file where a previously-durable one used to be.

use std::fs;
use std::path::{Path, PathBuf};

use ic_common::{Error, Result, SessionId};
use serde::{Deserialize, Serialize};

use super::{AudioRecord, SessionRecord, Store, StoreStats};

#[derive(Debug, Serialize, Deserialize)]
struct AudioMeta {
    #[serde(rename = "mimeType")]
    mime_type: String,
    #[serde(rename = "chunkCount")]
    chunk_count: usize,
}

/// A store rooted at a directory, normally `dirs::data_dir()` joined with
/// `interview-conditioning`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Root the store at the platform data directory (XDG on Linux,
    /// `Application Support` on macOS, `%APPDATA%` on Windows).
    pub fn new() -> Result<Self> {
        let base = dirs::data_dir().ok_or(Error::NoDataDir)?;
        Self::at(base.join("interview-conditioning"))
    }

    /// Root the store at an arbitrary directory — used by tests via
    /// `tempfile::TempDir`.
    pub fn at(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(root.join("sessions"))?;
        fs::create_dir_all(root.join("audio"))?;
        Ok(FileStore { root })
    }

    fn sessions_dir(&self) -> PathBuf {
        self.root.join("sessions")
    }

    fn audio_dir(&self, session_id: &SessionId) -> PathBuf {
        self.root.join("audio").join(session_id.as_str())
    }

    fn session_path(&self, id: &SessionId) -> PathBuf {
        self.sessions_dir().join(format!("{}.json", id.as_str()))
    }

    /// Write `bytes` to `path` atomically: write a sibling temp file, then
    /// rename it over the destination.
    fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    fn read_session_file(path: &Path) -> Result<SessionRecord> {
        let bytes = fs::read(path)?;
        serde_json::from_slice(&bytes)
            .map_err(|e| Error::SessionCorrupted(format!("{}: {e}", path.display())))
    }
}

impl Store for FileStore {
    fn put_session(&mut self, record: SessionRecord) -> Result<()> {
        let path = self.session_path(&record.id);
        let bytes = serde_json::to_vec_pretty(&record)?;
        Self::write_atomic(&path, &bytes)
    }

    fn get_session(&self, id: &SessionId) -> Result<Option<SessionRecord>> {
        let path = self.session_path(id);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(Self::read_session_file(&path)?))
    }

    fn get_all_sessions(&self) -> Result<Vec<SessionRecord>> {
        let mut records = Vec::new();
        for entry in fs::read_dir(self.sessions_dir())? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let record = Self::read_session_file(&path)?;
            if !record.is_soft_deleted() {
                records.push(record);
            }
        }
        records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(records)
    }

    fn soft_delete_session(&mut self, id: &SessionId) -> Result<()> {
        if let Some(mut record) = self.get_session(id)? {
            record.deleted_at = Some(record.updated_at);
            self.put_session(record)?;
        }
        Ok(())
    }

    fn get_incomplete_session(&self) -> Result<Option<SessionRecord>> {
        let mut candidates: Vec<SessionRecord> = Vec::new();
        for entry in fs::read_dir(self.sessions_dir())? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let record = Self::read_session_file(&path)?;
            if record.looks_in_progress() {
                candidates.push(record);
            }
        }
        candidates.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(candidates.into_iter().next())
    }

    fn save_audio_chunk(&mut self, session_id: &SessionId, blob: Vec<u8>, mime_type: &str) -> Result<()> {
        let dir = self.audio_dir(session_id);
        fs::create_dir_all(&dir)?;
        let meta_path = dir.join("meta.json");
        let mut meta = if meta_path.exists() {
            let bytes = fs::read(&meta_path)?;
            serde_json::from_slice(&bytes)?
        } else {
            AudioMeta {
                mime_type: mime_type.to_string(),
                chunk_count: 0,
            }
        };
        let chunk_path = dir.join(format!("{}.bin", meta.chunk_count));
        Self::write_atomic(&chunk_path, &blob)?;
        meta.mime_type = mime_type.to_string();
        meta.chunk_count += 1;
        Self::write_atomic(&meta_path, &serde_json::to_vec(&meta)?)
    }

    fn get_audio(&self, session_id: &SessionId) -> Result<Option<AudioRecord>> {
        let dir = self.audio_dir(session_id);
        let meta_path = dir.join("meta.json");
        if !meta_path.exists() {
            return Ok(None);
        }
        let meta: AudioMeta = serde_json::from_slice(&fs::read(&meta_path)?)?;
        let mut chunks = Vec::with_capacity(meta.chunk_count);
        for n in 0..meta.chunk_count {
            chunks.push(fs::read(dir.join(format!("{n}.bin")))?);
        }
        Ok(Some(AudioRecord {
            session_id: session_id.clone(),
            chunks,
            mime_type: meta.mime_type,
        }))
    }

    fn delete_audio(&mut self, session_id: &SessionId) -> Result<()> {
        let dir = self.audio_dir(session_id);
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
        }
        Ok(())
    }

    fn list_audio_session_ids(&self) -> Result<Vec<SessionId>> {
        let root = self.root.join("audio");
        let mut ids = Vec::new();
        for entry in fs::read_dir(&root)? {
            let entry = entry?;
            if entry.path().is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    ids.push(SessionId(name.to_string()));
                }
            }
        }
        Ok(ids)
    }

    fn get_stats(&self) -> Result<StoreStats> {
        let session_count = self.get_all_sessions()?.len();
        let audio_count = fs::read_dir(self.root.join("audio"))?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_dir())
            .count();
        Ok(StoreStats {
            session_count,
            audio_count,
        })
    }

    fn clear_all(&mut self) -> Result<()> {
        fs::remove_dir_all(&self.root)?;
        fs::create_dir_all(self.sessions_dir())?;
        fs::create_dir_all(self.root.join("audio"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Event, EventKind};
    use crate::event_log::EventLog;
    use ic_config::{PresetName, Problem};

    fn problem() -> Problem {
        Problem {
            id: "two-sum".into(),
            title: "Two Sum".into(),
            description: "desc".into(),
            difficulty: "easy".into(),
        }
    }

    fn record(id: &str, updated_at: i64) -> SessionRecord {
        let mut events = EventLog::new();
        events.append(Event::new(
            0,
            EventKind::SessionStarted {
                problem_id: "two-sum".into(),
                preset: PresetName::Standard,
            },
        ));
        SessionRecord {
            id: SessionId(id.to_string()),
            problem: problem(),
            preset: PresetName::Standard,
            events,
            created_at: 0,
            updated_at,
            deleted_at: None,
        }
    }

    #[test]
    fn put_then_get_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::at(dir.path()).unwrap();
        let r = record("sess-a", 100);
        store.put_session(r.clone()).unwrap();
        assert_eq!(store.get_session(&r.id).unwrap(), Some(r));
    }

    #[test]
    fn a_crash_mid_write_never_corrupts_the_prior_durable_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::at(dir.path()).unwrap();
        store.put_session(record("sess-a", 100)).unwrap();
        // The temp file from a hypothetical interrupted write should never
        // replace the destination unless rename completes; since we only
        // ever call write_atomic to completion here, the durable file must
        // still parse.
        let read_back = store.get_session(&SessionId("sess-a".into())).unwrap();
        assert!(read_back.is_some());
    }

    #[test]
    fn soft_delete_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let id = SessionId("sess-a".into());
        {
            let mut store = FileStore::at(dir.path()).unwrap();
            store.put_session(record("sess-a", 100)).unwrap();
            store.soft_delete_session(&id).unwrap();
        }
        let store = FileStore::at(dir.path()).unwrap();
        assert!(store.get_all_sessions().unwrap().is_empty());
        assert!(store.get_session(&id).unwrap().unwrap().is_soft_deleted());
    }

    #[test]
    fn audio_chunks_accumulate_and_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let id = SessionId("sess-a".into());
        {
            let mut store = FileStore::at(dir.path()).unwrap();
            store.save_audio_chunk(&id, vec![1, 2, 3], "audio/webm").unwrap();
            store.save_audio_chunk(&id, vec![4, 5], "audio/webm").unwrap();
        }
        let store = FileStore::at(dir.path()).unwrap();
        let audio = store.get_audio(&id).unwrap().unwrap();
        assert_eq!(audio.chunks, vec![vec![1, 2, 3], vec![4, 5]]);
        assert_eq!(audio.mime_type, "audio/webm");
    }

    #[test]
    fn clear_all_removes_everything_but_leaves_the_store_usable() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::at(dir.path()).unwrap();
        store.put_session(record("sess-a", 100)).unwrap();
        store.clear_all().unwrap();
        assert_eq!(store.get_stats().unwrap().session_count, 0);
        // Store must still accept writes after clearing.
        store.put_session(record("sess-b", 200)).unwrap();
        assert_eq!(store.get_stats().unwrap().session_count, 1);
    }
}
