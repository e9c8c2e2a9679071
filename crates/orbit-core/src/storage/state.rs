//! JSON state blob persistence.
//!
//! The whole application state lives in one `state.json` file that is
//! overwritten on every save. Loading is lenient (a missing or oddly
//! shaped section falls back to empty) so a blob written by an older
//! client still opens; importing is strict about the tasks array and
//! rejects the payload wholesale when it is missing, leaving prior
//! state untouched.
//!
//! The active session snapshot is kept in a separate `session.json` so
//! the state blob schema stays stable.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::StorageError;
use crate::graph::Connection;
use crate::log::LogEntry;
use crate::session::{SessionEngine, SessionOutcome};
use crate::task::Task;

/// Blob schema version.
pub const STORAGE_VERSION: &str = "2.0";

/// User settings carried inside the state blob.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    #[serde(rename = "audioEnabled", default = "default_true")]
    pub audio_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            audio_enabled: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Full state blob as written to `state.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedState {
    pub orbits: Vec<Task>,
    pub connections: Vec<Connection>,
    pub logs: Vec<LogEntry>,
    pub settings: Settings,
    pub version: String,
    #[serde(rename = "savedAt")]
    pub saved_at: DateTime<Utc>,
}

/// Export payload: the blob minus settings, stamped with `exportedAt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportPayload {
    pub orbits: Vec<Task>,
    pub connections: Vec<Connection>,
    pub logs: Vec<LogEntry>,
    pub version: String,
    #[serde(rename = "exportedAt")]
    pub exported_at: DateTime<Utc>,
}

/// Engine state plus any unresolved post-session debrief, persisted
/// between CLI invocations in `session.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeState {
    #[serde(default)]
    pub engine: SessionEngine,
    #[serde(default)]
    pub pending: Option<SessionOutcome>,
}

/// Validated result of an import.
#[derive(Debug, Clone)]
pub struct ImportedData {
    pub orbits: Vec<Task>,
    pub connections: Vec<Connection>,
    pub logs: Vec<LogEntry>,
}

/// File-backed store for the state blob and the session snapshot.
pub struct StateFile {
    path: PathBuf,
    session_path: PathBuf,
}

impl StateFile {
    /// Open the store in the default data directory.
    pub fn open() -> Result<Self, StorageError> {
        Ok(Self::in_dir(&data_dir()?))
    }

    /// Open the store in a custom directory (tests use a tempdir).
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join("state.json"),
            session_path: dir.join("session.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the state blob. Returns None when no file exists yet.
    /// Unexpected shapes inside the blob degrade to empty sections;
    /// unreadable JSON is an error.
    pub fn load(&self) -> Result<Option<PersistedState>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&self.path).map_err(|e| StorageError::LoadFailed {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        let value: Value =
            serde_json::from_str(&raw).map_err(|e| StorageError::LoadFailed {
                path: self.path.clone(),
                message: e.to_string(),
            })?;
        Ok(Some(PersistedState {
            orbits: lenient_vec(value.get("orbits")),
            connections: lenient_vec(value.get("connections")),
            logs: lenient_vec(value.get("logs")),
            settings: value
                .get("settings")
                .cloned()
                .and_then(|v| serde_json::from_value(v).ok())
                .unwrap_or_default(),
            version: value
                .get("version")
                .and_then(|v| v.as_str())
                .unwrap_or(STORAGE_VERSION)
                .to_string(),
            saved_at: value
                .get("savedAt")
                .cloned()
                .and_then(|v| serde_json::from_value(v).ok())
                .unwrap_or_else(Utc::now),
        }))
    }

    /// Overwrite the state blob with the given full state.
    pub fn save(&self, state: &PersistedState) -> Result<(), StorageError> {
        let json =
            serde_json::to_string_pretty(state).map_err(|e| StorageError::SaveFailed {
                path: self.path.clone(),
                message: e.to_string(),
            })?;
        std::fs::write(&self.path, json).map_err(|e| StorageError::SaveFailed {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    /// Remove both the state blob and the session snapshot.
    pub fn clear(&self) -> Result<(), StorageError> {
        for path in [&self.path, &self.session_path] {
            if path.exists() {
                std::fs::remove_file(path).map_err(|e| StorageError::SaveFailed {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
            }
        }
        Ok(())
    }

    /// Load the persisted runtime state; a missing or corrupt snapshot
    /// yields an idle engine with no pending debrief.
    pub fn load_runtime(&self) -> RuntimeState {
        std::fs::read_to_string(&self.session_path)
            .ok()
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default()
    }

    pub fn save_runtime(&self, runtime: &RuntimeState) -> Result<(), StorageError> {
        let json = serde_json::to_string(runtime).map_err(|e| StorageError::SaveFailed {
            path: self.session_path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&self.session_path, json).map_err(|e| StorageError::SaveFailed {
            path: self.session_path.clone(),
            message: e.to_string(),
        })
    }
}

/// Validate an import payload.
///
/// The payload must carry an `orbits` array of well-formed tasks;
/// otherwise the whole import is rejected and the caller keeps its
/// prior state. Missing or non-array `connections`/`logs` default to
/// empty.
pub fn parse_import(json: &str) -> Result<ImportedData, StorageError> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| StorageError::ImportRejected(format!("invalid JSON: {e}")))?;

    let orbits_value = value
        .get("orbits")
        .filter(|v| v.is_array())
        .ok_or_else(|| StorageError::ImportRejected("missing orbits array".to_string()))?;
    let orbits: Vec<Task> = serde_json::from_value(orbits_value.clone())
        .map_err(|e| StorageError::ImportRejected(format!("malformed task: {e}")))?;

    Ok(ImportedData {
        orbits,
        connections: lenient_vec(value.get("connections")),
        logs: lenient_vec(value.get("logs")),
    })
}

/// Deserialize a Vec field, treating anything unexpected as empty.
fn lenient_vec<T: DeserializeOwned>(value: Option<&Value>) -> Vec<T> {
    value
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{TaskDraft, TaskStore};
    use crate::tier::Tier;
    use tempfile::TempDir;

    fn sample_state() -> PersistedState {
        let mut store = TaskStore::default();
        store
            .create(TaskDraft {
                name: "A".to_string(),
                tier: Tier::Min25,
                ..Default::default()
            })
            .unwrap();
        PersistedState {
            orbits: store.all().to_vec(),
            connections: vec![],
            logs: vec![],
            settings: Settings::default(),
            version: STORAGE_VERSION.to_string(),
            saved_at: Utc::now(),
        }
    }

    #[test]
    fn load_returns_none_for_missing_file() {
        let dir = TempDir::new().unwrap();
        let file = StateFile::in_dir(dir.path());
        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let file = StateFile::in_dir(dir.path());
        file.save(&sample_state()).unwrap();

        let loaded = file.load().unwrap().unwrap();
        assert_eq!(loaded.orbits.len(), 1);
        assert_eq!(loaded.orbits[0].name, "A");
        assert_eq!(loaded.version, STORAGE_VERSION);
        assert!(loaded.settings.audio_enabled);
    }

    #[test]
    fn load_tolerates_odd_sections() {
        let dir = TempDir::new().unwrap();
        let file = StateFile::in_dir(dir.path());
        std::fs::write(
            file.path(),
            r#"{"orbits": [], "connections": "oops", "logs": null}"#,
        )
        .unwrap();
        let loaded = file.load().unwrap().unwrap();
        assert!(loaded.connections.is_empty());
        assert!(loaded.logs.is_empty());
    }

    #[test]
    fn load_rejects_unreadable_json() {
        let dir = TempDir::new().unwrap();
        let file = StateFile::in_dir(dir.path());
        std::fs::write(file.path(), "{not json").unwrap();
        assert!(matches!(
            file.load(),
            Err(StorageError::LoadFailed { .. })
        ));
    }

    #[test]
    fn import_requires_tasks_array() {
        assert!(matches!(
            parse_import(r#"{"orbits": "not-an-array"}"#),
            Err(StorageError::ImportRejected(_))
        ));
        assert!(matches!(
            parse_import(r#"{"connections": []}"#),
            Err(StorageError::ImportRejected(_))
        ));
        assert!(matches!(
            parse_import("]["),
            Err(StorageError::ImportRejected(_))
        ));
    }

    #[test]
    fn import_defaults_missing_sections_to_empty() {
        let data = parse_import(r#"{"orbits": [], "logs": 42}"#).unwrap();
        assert!(data.orbits.is_empty());
        assert!(data.connections.is_empty());
        assert!(data.logs.is_empty());
    }

    #[test]
    fn import_accepts_original_client_payload() {
        let json = r#"{
            "orbits": [{
                "id": "x1",
                "name": "Write report",
                "objective": "",
                "deadline": null,
                "tier": "50",
                "duration": 50,
                "processes": [{"text": "outline", "type": "positive"}],
                "x": 120.0,
                "y": 80.0,
                "size": 140,
                "isSessionCompleted": false,
                "isObjectiveAchieved": false,
                "createdAt": "2024-01-01T00:00:00Z"
            }],
            "connections": [{"id": "c1", "sourceId": "x1", "targetId": "x2"}],
            "exportedAt": "2024-01-02T00:00:00Z",
            "version": "2.0"
        }"#;
        let data = parse_import(json).unwrap();
        assert_eq!(data.orbits[0].duration_minutes, 50);
        assert_eq!(data.connections[0].source_id, "x1");
    }

    #[test]
    fn runtime_snapshot_round_trip_and_fallback() {
        let dir = TempDir::new().unwrap();
        let file = StateFile::in_dir(dir.path());

        // Missing snapshot yields an idle engine.
        let runtime = file.load_runtime();
        assert!(!runtime.engine.is_active());
        assert!(runtime.pending.is_none());

        file.save_runtime(&RuntimeState::default()).unwrap();
        assert!(!file.load_runtime().engine.is_active());

        // Corrupt snapshot also falls back to idle.
        std::fs::write(dir.path().join("session.json"), "garbage").unwrap();
        assert!(!file.load_runtime().engine.is_active());
    }

    #[test]
    fn clear_removes_files() {
        let dir = TempDir::new().unwrap();
        let file = StateFile::in_dir(dir.path());
        file.save(&sample_state()).unwrap();
        file.save_runtime(&RuntimeState::default()).unwrap();
        file.clear().unwrap();
        assert!(file.load().unwrap().is_none());
    }
}
