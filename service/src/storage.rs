use crate::models::SessionMeta;
use omci_parser::AnalysisResult;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Payload encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("Payload decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid message id: {0}")]
    InvalidId(String),
}

/// Maps a missing file to `NotFound` so handlers can answer 404.
fn not_found_as(what: String) -> impl FnOnce(io::Error) -> StorageError {
    move |e| match e.kind() {
        io::ErrorKind::NotFound => StorageError::NotFound(what),
        _ => StorageError::Io(e),
    }
}

/// File-backed session store. Each session directory holds `meta.json`,
/// `analysis.json` (messages without raw text) and one MessagePack payload
/// per message with its raw chunk.
pub struct SessionStorage {
    base_path: PathBuf,
}

impl SessionStorage {
    pub fn new(base_path: impl AsRef<Path>) -> io::Result<Self> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    pub fn create_session(&self) -> Result<String, StorageError> {
        let session_id = Uuid::new_v4().to_string();
        let session_path = self.base_path.join(&session_id);

        fs::create_dir_all(session_path.join("payloads"))?;

        Ok(session_id)
    }

    /// Session ids are uuids; anything else could escape the data directory.
    pub fn session_path(&self, session_id: &str) -> Result<PathBuf, StorageError> {
        Uuid::parse_str(session_id)
            .map(|id| self.base_path.join(id.to_string()))
            .map_err(|_| StorageError::NotFound(format!("session {}", session_id)))
    }

    pub fn delete_session(&self, session_id: &str) -> Result<(), StorageError> {
        let session_path = self.session_path(session_id)?;
        if session_path.exists() {
            fs::remove_dir_all(session_path)?;
            info!("Deleted session {}", session_id);
        }
        Ok(())
    }

    pub fn list_sessions(&self) -> Result<Vec<SessionMeta>, StorageError> {
        let mut sessions = Vec::new();

        for entry in fs::read_dir(&self.base_path)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            match self.read_meta(&name) {
                Ok(meta) => sessions.push(meta),
                Err(e) => debug!("Skipping {}: {}", name, e),
            }
        }

        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions)
    }

    pub fn write_meta(&self, session_id: &str, meta: &SessionMeta) -> Result<(), StorageError> {
        let meta_path = self.session_path(session_id)?.join("meta.json");
        let json = serde_json::to_string_pretty(meta)?;
        let mut file = fs::File::create(meta_path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    pub fn read_meta(&self, session_id: &str) -> Result<SessionMeta, StorageError> {
        let meta_path = self.session_path(session_id)?.join("meta.json");
        let json = fs::read_to_string(meta_path).map_err(not_found_as(format!("session {}", session_id)))?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn write_analysis(&self, session_id: &str, analysis: &AnalysisResult) -> Result<(), StorageError> {
        let path = self.session_path(session_id)?.join("analysis.json");
        let mut writer = io::BufWriter::new(fs::File::create(path)?);
        serde_json::to_writer(&mut writer, analysis)?;
        writer.flush()?;
        Ok(())
    }

    pub fn read_analysis(&self, session_id: &str) -> Result<AnalysisResult, StorageError> {
        let path = self.session_path(session_id)?.join("analysis.json");
        let file = fs::File::open(path).map_err(not_found_as(format!("session {}", session_id)))?;
        Ok(serde_json::from_reader(io::BufReader::new(file))?)
    }

    fn payload_path(&self, session_id: &str, message_id: &str) -> Result<PathBuf, StorageError> {
        let safe = !message_id.is_empty()
            && message_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !safe {
            return Err(StorageError::InvalidId(message_id.to_string()));
        }

        Ok(self.session_path(session_id)?
            .join("payloads")
            .join(format!("{}.mp", message_id)))
    }

    pub fn write_payload(&self, session_id: &str, message_id: &str, raw: &str) -> Result<(), StorageError> {
        let msgpack = rmp_serde::to_vec(raw)?;
        fs::write(self.payload_path(session_id, message_id)?, msgpack)?;
        Ok(())
    }

    pub fn read_payload(&self, session_id: &str, message_id: &str) -> Result<String, StorageError> {
        let path = self.payload_path(session_id, message_id)?;
        let msgpack = fs::read(path).map_err(not_found_as(format!("message {}", message_id)))?;
        Ok(rmp_serde::from_slice(&msgpack)?)
    }
}

/// Persists a finished analysis: raw chunks go to payload files, the rest
/// to `analysis.json`, and the summary to `meta.json`. On failure the
/// session directory is removed again.
pub fn ingest_analysis(
    storage: &SessionStorage,
    session_id: &str,
    filename: &str,
    parser: &str,
    analysis: AnalysisResult,
) -> Result<SessionMeta, StorageError> {
    write_session(storage, session_id, filename, parser, analysis).map_err(|e| {
        warn!("Ingest failed for session {}, removing it: {}", session_id, e);
        if let Err(cleanup) = storage.delete_session(session_id) {
            warn!("Failed to remove session {}: {}", session_id, cleanup);
        }
        e
    })
}

fn write_session(
    storage: &SessionStorage,
    session_id: &str,
    filename: &str,
    parser: &str,
    mut analysis: AnalysisResult,
) -> Result<SessionMeta, StorageError> {
    for msg in &mut analysis.messages {
        let raw = std::mem::take(&mut msg.raw);
        storage.write_payload(session_id, &msg.id, &raw)?;
    }
    debug!("Wrote {} payloads for session {}", analysis.messages.len(), session_id);

    storage.write_analysis(session_id, &analysis)?;

    let meta = SessionMeta::from_analysis(session_id, filename, parser, &analysis);
    storage.write_meta(session_id, &meta)?;

    Ok(meta)
}
