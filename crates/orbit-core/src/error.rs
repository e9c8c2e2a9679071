//! Core error types for orbit-core.
//!
//! Component-level failures (validation, graph edits, session control,
//! storage) each get their own enum; `CoreError` is the umbrella type
//! crossing the library boundary. No failure here is fatal -- every
//! variant means "operation did not apply" with a reason.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for orbit-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Dependency graph errors
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    /// Session engine errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Storage-specific errors.
///
/// A failed save or import never rolls back or corrupts in-memory
/// state; callers report the failure and carry on.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to write the state blob
    #[error("Failed to save state to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to read or parse the state blob
    #[error("Failed to load state from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Import payload rejected wholesale; prior state retained
    #[error("Import rejected: {0}")]
    ImportRejected(String),

    /// Data directory could not be resolved or created
    #[error("Data directory error: {0}")]
    DataDir(String),

    /// Failed to load or save configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Dependency graph edit errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum GraphError {
    /// Self-loops are forbidden
    #[error("Cannot connect a task to itself")]
    SelfLoop,

    /// At most one edge per unordered pair
    #[error("Connection already exists between {a} and {b}")]
    Duplicate { a: String, b: String },
}

/// Session engine errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    /// At most one session may be active system-wide
    #[error("A session is already active")]
    AlreadyActive,

    /// No session to operate on
    #[error("No active session")]
    NotActive,

    /// Target task has an incomplete prerequisite
    #[error("Task '{id}' is locked by incomplete prerequisites")]
    Locked { id: String },

    /// Target task does not exist
    #[error("Task '{id}' not found")]
    TaskNotFound { id: String },

    /// A previous session is waiting for its objective answer
    #[error("A session debrief is pending; answer it first")]
    DebriefPending,

    /// No session result is waiting for an answer
    #[error("No session debrief is pending")]
    NoDebrief,
}

/// Validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Task name must be non-empty
    #[error("Task name must not be empty")]
    EmptyName,

    /// Checklist item text must be non-empty
    #[error("Checklist item text must not be empty")]
    EmptyProcessText,

    /// Unknown task id
    #[error("Task '{id}' not found")]
    TaskNotFound { id: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
