//! `session.json` — the structured half of an export archive.

use serde::{Deserialize, Serialize};

use ic_config::PresetName;
use ic_core::{Event, ReflectionResponses};

use crate::error::{ExportError, Result};

/// Current manifest schema version. Bumped only on a breaking change to the
/// shape below; additive fields do not need a bump.
pub const MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportProblem {
    pub id: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportTiming {
    #[serde(rename = "createdAt")]
    pub created_at: i64,
    #[serde(rename = "updatedAt")]
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub version: u32,
    #[serde(rename = "sessionId")]
    pub session_id: String,
    /// ISO-8601, e.g. `2026-07-27T14:30:22Z`.
    #[serde(rename = "exportedAt")]
    pub exported_at: String,
    pub problem: ExportProblem,
    pub preset: PresetName,
    pub timing: ExportTiming,
    #[serde(rename = "eventCount")]
    pub event_count: usize,
}

/// The full `session.json` contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionManifest {
    pub metadata: ExportMetadata,
    pub events: Vec<Event>,
    pub reflection: Option<ReflectionResponses>,
}

impl SessionManifest {
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self> {
        let manifest: SessionManifest = serde_json::from_slice(bytes)
            .map_err(|e| ExportError::CorruptedManifest(e.to_string()))?;
        if manifest.metadata.version != MANIFEST_VERSION {
            return Err(ExportError::UnsupportedVersion {
                version: manifest.metadata.version,
                supported: MANIFEST_VERSION,
            });
        }
        Ok(manifest)
    }
}
