//! The export codec itself (C9): gzip-over-ustar-tar with a fixed file
//! layout.
//!
//! Container framing is handled entirely by `tar` and `flate2`; this module
//! only owns the file set and their contents. Decoding an archive this
//! module wrote must yield bit-identical file contents.

use std::io::{Read, Write};

use chrono::Utc;
use tar::{Builder as TarBuilder, Header};
use tracing::debug;

use ic_core::{AudioRecord, SessionRecord};

use crate::error::{ExportError, Result};
use crate::manifest::{ExportMetadata, ExportProblem, ExportTiming, SessionManifest, MANIFEST_VERSION};

const README_CONTENTS: &str = "\
Interview Conditioning session export
======================================

This archive is a record of one practice session, produced by the export
codec. It contains:

  session.json    Structured metadata, the full event log, and the
                   reflection responses (if the session reached REFLECTION).
  code.txt         The final state of the code editor.
  invariants.txt   The final free-form preparation notes.
  audio.<ext>      The concatenated audio recording, if one was captured.

The event log in session.json is the source of truth: everything else in
this bundle (phase, timers, nudge counts) can be recomputed by folding it.
";

/// The decoded contents of an archive produced by [`write_archive`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedBundle {
    pub manifest: SessionManifest,
    pub code: String,
    pub invariants: String,
    /// `(bytes, mime_type)` if the archive carried an audio file.
    pub audio: Option<(Vec<u8>, String)>,
}

fn audio_extension(mime_type: &str) -> &'static str {
    if mime_type.starts_with("audio/webm") {
        "webm"
    } else if mime_type.starts_with("audio/mp4") {
        "m4a"
    } else {
        "audio"
    }
}

fn append_file(builder: &mut TarBuilder<impl Write>, path: &str, contents: &[u8]) -> Result<()> {
    let mut header = Header::new_ustar();
    header.set_path(path)?;
    header.set_size(contents.len() as u64);
    header.set_mode(0o644);
    header.set_mtime(0);
    header.set_cksum();
    builder.append(&header, contents)?;
    Ok(())
}

/// Build the gzip+tar archive for a stored session. `audio` is `None` when
/// the session has no recording; its file is omitted entirely in that case.
pub fn write_archive(record: &SessionRecord, audio: Option<&AudioRecord>) -> Result<Vec<u8>> {
    let events = record.events.snapshot();
    let code = last_code(&events);
    let invariants = last_invariants(&events);
    let reflection = last_reflection(&events);

    let manifest = SessionManifest {
        metadata: ExportMetadata {
            version: MANIFEST_VERSION,
            session_id: record.id.as_str().to_string(),
            exported_at: Utc::now().to_rfc3339(),
            problem: ExportProblem {
                id: record.problem.id.clone(),
                title: record.problem.title.clone(),
                description: record.problem.description.clone(),
            },
            preset: record.preset,
            timing: ExportTiming {
                created_at: record.created_at,
                updated_at: record.updated_at,
            },
            event_count: events.len(),
        },
        events,
        reflection,
    };

    let gz = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    let mut tar_builder = TarBuilder::new(gz);

    append_file(&mut tar_builder, "README.md", README_CONTENTS.as_bytes())?;
    append_file(&mut tar_builder, "session.json", &manifest.to_json_bytes()?)?;
    append_file(&mut tar_builder, "code.txt", code.as_bytes())?;
    append_file(&mut tar_builder, "invariants.txt", invariants.as_bytes())?;

    if let Some(audio) = audio {
        let ext = audio_extension(&audio.mime_type);
        let mut blob = Vec::new();
        for chunk in &audio.chunks {
            blob.extend_from_slice(chunk);
        }
        append_file(&mut tar_builder, &format!("audio.{ext}"), &blob)?;
    }

    let gz = tar_builder.into_inner()?;
    let bytes = gz.finish()?;
    debug!(
        session_id = %record.id.as_str(),
        bytes = bytes.len(),
        has_audio = audio.is_some(),
        "wrote session export archive"
    );
    Ok(bytes)
}

/// Decode an archive written by [`write_archive`].
pub fn read_archive(bytes: &[u8]) -> Result<ExportedBundle> {
    let decoder = flate2::read::GzDecoder::new(bytes);
    let mut tar_archive = tar::Archive::new(decoder);

    let mut session_json: Option<Vec<u8>> = None;
    let mut code: Option<String> = None;
    let mut invariants: Option<String> = None;
    let mut audio: Option<(Vec<u8>, String)> = None;
    let mut pending_audio_ext: Option<String> = None;

    for entry in tar_archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?.to_string_lossy().into_owned();
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents)?;

        match path.as_str() {
            "session.json" => session_json = Some(contents),
            "code.txt" => code = Some(String::from_utf8_lossy(&contents).into_owned()),
            "invariants.txt" => invariants = Some(String::from_utf8_lossy(&contents).into_owned()),
            "README.md" => {}
            other if other.starts_with("audio.") => {
                pending_audio_ext = other.strip_prefix("audio.").map(|s| s.to_string());
                audio = Some((contents, String::new()));
            }
            _ => {}
        }
    }

    let session_json =
        session_json.ok_or_else(|| ExportError::MissingFile("session.json".into()))?;
    let manifest = SessionManifest::from_json_bytes(&session_json)?;
    let code = code.ok_or_else(|| ExportError::MissingFile("code.txt".into()))?;
    let invariants =
        invariants.ok_or_else(|| ExportError::MissingFile("invariants.txt".into()))?;

    let audio = audio.map(|(bytes, _)| {
        let ext = pending_audio_ext.unwrap_or_default();
        let mime_type = match ext.as_str() {
            "webm" => "audio/webm",
            "m4a" => "audio/mp4",
            _ => "application/octet-stream",
        };
        (bytes, mime_type.to_string())
    });

    debug!(
        session_id = %manifest.metadata.session_id,
        bytes = bytes.len(),
        has_audio = audio.is_some(),
        "decoded session export archive"
    );

    Ok(ExportedBundle {
        manifest,
        code,
        invariants,
        audio,
    })
}

fn last_code(events: &[ic_core::Event]) -> String {
    let mut code = String::new();
    for event in events {
        match &event.kind {
            ic_core::EventKind::CodingCodeChanged { text }
            | ic_core::EventKind::CodingCodeChangedInSilent { text } => {
                code = text.clone();
            }
            _ => {}
        }
    }
    code
}

fn last_invariants(events: &[ic_core::Event]) -> String {
    let mut invariants = String::new();
    for event in events {
        if let ic_core::EventKind::PrepInvariantsChanged { text } = &event.kind {
            invariants = text.clone();
        }
    }
    invariants
}

fn last_reflection(
    events: &[ic_core::Event],
) -> Option<ic_core::ReflectionResponses> {
    events.iter().rev().find_map(|event| {
        if let ic_core::EventKind::ReflectionSubmitted { responses } = &event.kind {
            Some(responses.clone())
        } else {
            None
        }
    })
}
