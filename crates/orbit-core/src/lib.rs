//! # Orbit Core Library
//!
//! This library provides the core business logic for Orbit, a
//! dependency-gated task runner: tasks ("orbits") carry a time tier and
//! a checklist, dependency edges lock a task until its prerequisites
//! have completed a session, and each timed session yields an integrity
//! score that is recorded in a capped history log.
//!
//! ## Architecture
//!
//! - **Task Store**: in-memory task collection with CRUD and one-way
//!   completion flags
//! - **Dependency Graph**: unordered-existence, directed-semantics
//!   edges that compute each task's lock state
//! - **Session Engine**: a wall-clock-based state machine that requires
//!   the caller to periodically invoke `tick()` for countdown updates
//! - **History Log**: newest-first, capped record of past sessions
//! - **Storage**: JSON state blob plus TOML-based configuration
//!
//! The [`App`] struct owns all of the above; it is constructed from the
//! state blob at startup and persists after every mutation.

pub mod app;
pub mod error;
pub mod events;
pub mod graph;
pub mod log;
pub mod session;
pub mod storage;
pub mod task;
pub mod tier;

pub use app::{App, PendingDebrief};
pub use error::{CoreError, GraphError, SessionError, StorageError, ValidationError};
pub use events::Event;
pub use graph::{Connection, DependencyGraph, ToggleOutcome};
pub use log::{HistoryLog, LogEntry, LogStats, SessionStatus};
pub use session::{ChecklistItem, SessionEngine, SessionOutcome, SessionState};
pub use storage::{Config, Settings, StateFile};
pub use task::{ProcessItem, ProcessKind, Task, TaskDraft, TaskPatch, TaskStore};
pub use tier::Tier;
