//! Application state owner.
//!
//! `App` holds the task store, dependency graph, history log, session
//! engine and settings as one explicit value -- no globals. It is
//! constructed from the state blob at startup and persists the full
//! state after every mutation; a failed save reports the error and
//! leaves the in-memory state intact.
//!
//! Cross-component flows live here: edge cascade on task deletion,
//! lock-checked session start, and the post-session debrief where the
//! objective answer arrives after the session has already ended.

use crate::error::{CoreError, Result, SessionError, ValidationError};
use crate::events::Event;
use crate::graph::{Connection, DependencyGraph, ToggleOutcome};
use crate::log::{HistoryLog, LogEntry, LogStats, SessionStatus};
use crate::session::{SessionEngine, SessionOutcome};
use crate::storage::{
    parse_import, Config, ExportPayload, PersistedState, RuntimeState, Settings, StateFile,
    STORAGE_VERSION,
};
use crate::task::{Task, TaskDraft, TaskPatch, TaskStore};

/// Session result awaiting its objective-achieved answer.
pub type PendingDebrief = SessionOutcome;

pub struct App {
    tasks: TaskStore,
    graph: DependencyGraph,
    logs: HistoryLog,
    settings: Settings,
    engine: SessionEngine,
    pending: Option<PendingDebrief>,
    store: StateFile,
}

impl App {
    /// Open the application state from the default data directory,
    /// seeding settings from the TOML config on first run.
    pub fn open() -> Result<Self> {
        Self::with_store(StateFile::open()?)
    }

    /// Open the application state backed by the given store.
    pub fn with_store(store: StateFile) -> Result<Self> {
        let (tasks, graph, logs, settings) = match store.load()? {
            Some(state) => (
                TaskStore::new(state.orbits),
                DependencyGraph::new(state.connections),
                HistoryLog::new(state.logs),
                state.settings,
            ),
            None => {
                let config = Config::load().unwrap_or_default();
                (
                    TaskStore::default(),
                    DependencyGraph::default(),
                    HistoryLog::default(),
                    Settings {
                        audio_enabled: config.audio.enabled,
                    },
                )
            }
        };
        let runtime = store.load_runtime();
        Ok(Self {
            tasks,
            graph,
            logs,
            settings,
            engine: runtime.engine,
            pending: runtime.pending,
            store,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn tasks(&self) -> &TaskStore {
        &self.tasks
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn logs(&self) -> &HistoryLog {
        &self.logs
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_locked(&self, task_id: &str) -> bool {
        self.graph.is_locked(task_id, &self.tasks)
    }

    pub fn can_delete_freely(&self, task_id: &str) -> bool {
        self.tasks.can_delete_freely(task_id)
    }

    pub fn log_stats(&self) -> LogStats {
        self.logs.stats()
    }

    pub fn session_snapshot(&self) -> Event {
        self.engine.snapshot()
    }

    pub fn pending_debrief(&self) -> Option<&PendingDebrief> {
        self.pending.as_ref()
    }

    // ── Task operations ──────────────────────────────────────────────

    pub fn create_task(&mut self, draft: TaskDraft) -> Result<Task> {
        let task = self.tasks.create(draft)?;
        self.save()?;
        Ok(task)
    }

    pub fn update_task(&mut self, id: &str, patch: TaskPatch) -> Result<Task> {
        let task = self.tasks.update(id, patch)?;
        self.save()?;
        Ok(task)
    }

    pub fn move_task(&mut self, id: &str, x: f64, y: f64) -> Result<()> {
        if !self.tasks.update_position(id, x, y) {
            return Err(ValidationError::TaskNotFound { id: id.to_string() }.into());
        }
        self.save()
    }

    pub fn resize_task(&mut self, id: &str, size: u32) -> Result<()> {
        if !self.tasks.update_size(id, size) {
            return Err(ValidationError::TaskNotFound { id: id.to_string() }.into());
        }
        self.save()
    }

    /// Delete a task and cascade removal of every edge touching it.
    /// Returns false (without persisting) when the id is unknown.
    /// The soft deletion guard is the caller's decision point via
    /// [`App::can_delete_freely`]; deletion here is unconditional.
    pub fn delete_task(&mut self, id: &str) -> Result<bool> {
        if !self.tasks.delete(id) {
            return Ok(false);
        }
        self.graph.remove_all_for_task(id);
        self.save()?;
        Ok(true)
    }

    pub fn mark_session_completed(&mut self, id: &str) -> Result<bool> {
        let changed = self.tasks.mark_session_completed(id);
        if changed {
            self.save()?;
        }
        Ok(changed)
    }

    pub fn mark_objective_achieved(&mut self, id: &str) -> Result<bool> {
        let changed = self.tasks.mark_objective_achieved(id);
        if changed {
            self.save()?;
        }
        Ok(changed)
    }

    /// Clear both progress flags on every task so the graph can be
    /// replayed from the start.
    pub fn reset_all_progress(&mut self) -> Result<()> {
        self.tasks.reset_all_progress();
        self.save()
    }

    pub fn set_audio_enabled(&mut self, enabled: bool) -> Result<()> {
        self.settings.audio_enabled = enabled;
        self.save()
    }

    // ── Dependency edges ─────────────────────────────────────────────

    pub fn link(&mut self, source: &str, target: &str) -> Result<Connection> {
        self.require_task(source)?;
        self.require_task(target)?;
        let edge = self.graph.create(source, target)?;
        self.save()?;
        Ok(edge)
    }

    pub fn unlink(&mut self, a: &str, b: &str) -> Result<bool> {
        let removed = self.graph.remove(a, b);
        if removed {
            self.save()?;
        }
        Ok(removed)
    }

    pub fn toggle_link(&mut self, source: &str, target: &str) -> Result<ToggleOutcome> {
        self.require_task(source)?;
        self.require_task(target)?;
        let outcome = self.graph.toggle(source, target)?;
        self.save()?;
        Ok(outcome)
    }

    fn require_task(&self, id: &str) -> Result<&Task> {
        self.tasks
            .get(id)
            .ok_or_else(|| ValidationError::TaskNotFound { id: id.to_string() }.into())
    }

    // ── Session flow ─────────────────────────────────────────────────

    /// Start a session on a task. Fails when a session is already
    /// active, when a debrief is still unanswered, when the task does
    /// not exist, or when it is locked by incomplete prerequisites.
    pub fn start_session(&mut self, task_id: &str) -> Result<Event> {
        if self.pending.is_some() {
            return Err(SessionError::DebriefPending.into());
        }
        let task = self
            .tasks
            .get(task_id)
            .ok_or_else(|| SessionError::TaskNotFound {
                id: task_id.to_string(),
            })?;
        if self.engine.is_active() {
            return Err(SessionError::AlreadyActive.into());
        }
        if self.graph.is_locked(task_id, &self.tasks) {
            return Err(SessionError::Locked {
                id: task_id.to_string(),
            }
            .into());
        }
        let event = self.engine.start(task)?;
        self.save_runtime()?;
        Ok(event)
    }

    /// Advance the countdown by elapsed wall-clock time.
    pub fn tick(&mut self) -> Result<Option<Event>> {
        let event = self.engine.tick();
        self.save_runtime()?;
        Ok(event)
    }

    pub fn toggle_pause(&mut self) -> Result<Option<Event>> {
        let event = self.engine.toggle_pause();
        if event.is_some() {
            self.save_runtime()?;
        }
        Ok(event)
    }

    pub fn toggle_checklist_item(&mut self, index: usize) -> Result<Option<Event>> {
        let event = self.engine.toggle_checklist_item(index);
        if event.is_some() {
            self.save_runtime()?;
        }
        Ok(event)
    }

    /// End the active session. A completed session marks the task's
    /// one-way completion flag; an aborted one never does. The outcome
    /// is held as the pending debrief until [`App::resolve_objective`]
    /// merges in the objective answer and writes the history log.
    pub fn end_session(&mut self, status: SessionStatus) -> Result<SessionOutcome> {
        let outcome = self.engine.end(status)?;
        if status == SessionStatus::Complete {
            // Tolerate a task deleted mid-session.
            self.tasks.mark_session_completed(&outcome.task_id);
        }
        self.pending = Some(outcome.clone());
        self.save()?;
        self.save_runtime()?;
        Ok(outcome)
    }

    /// Answer the post-session objective question: writes the log
    /// entry and, on a yes, marks the task's objective flag.
    pub fn resolve_objective(&mut self, achieved: bool) -> Result<LogEntry> {
        let outcome = self.pending.take().ok_or(SessionError::NoDebrief)?;
        let entry = self.logs.add(&outcome, achieved).clone();
        if achieved {
            self.tasks.mark_objective_achieved(&outcome.task_id);
        }
        self.save()?;
        self.save_runtime()?;
        Ok(entry)
    }

    // ── History log ──────────────────────────────────────────────────

    pub fn clear_logs(&mut self) -> Result<()> {
        self.logs.clear();
        self.save()
    }

    // ── Import / export / reset ──────────────────────────────────────

    /// Export the state blob minus settings, stamped with `exportedAt`.
    pub fn export_json(&self) -> Result<String> {
        let payload = ExportPayload {
            orbits: self.tasks.all().to_vec(),
            connections: self.graph.all().to_vec(),
            logs: self.logs.all().to_vec(),
            version: STORAGE_VERSION.to_string(),
            exported_at: chrono::Utc::now(),
        };
        Ok(serde_json::to_string_pretty(&payload)?)
    }

    /// Replace tasks, edges and logs from an export payload. Validation
    /// happens before anything is touched, so a rejected payload leaves
    /// the existing state fully intact.
    pub fn import_json(&mut self, json: &str) -> Result<()> {
        let data = parse_import(json)?;
        self.tasks = TaskStore::new(data.orbits);
        self.graph = DependencyGraph::new(data.connections);
        self.logs = HistoryLog::new(data.logs);
        self.save()
    }

    /// Drop all tasks, edges, logs and any persisted files.
    pub fn clear_all_data(&mut self) -> Result<()> {
        self.tasks = TaskStore::default();
        self.graph = DependencyGraph::default();
        self.logs = HistoryLog::default();
        self.engine = SessionEngine::new();
        self.pending = None;
        self.store.clear()?;
        Ok(())
    }

    // ── Persistence ──────────────────────────────────────────────────

    fn save(&self) -> Result<()> {
        let state = PersistedState {
            orbits: self.tasks.all().to_vec(),
            connections: self.graph.all().to_vec(),
            logs: self.logs.all().to_vec(),
            settings: self.settings.clone(),
            version: STORAGE_VERSION.to_string(),
            saved_at: chrono::Utc::now(),
        };
        self.store.save(&state)?;
        Ok(())
    }

    fn save_runtime(&self) -> Result<()> {
        self.store.save_runtime(&RuntimeState {
            engine: self.engine.clone(),
            pending: self.pending.clone(),
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{ProcessItem, ProcessKind};
    use crate::tier::Tier;
    use tempfile::TempDir;

    fn test_app(dir: &TempDir) -> App {
        App::with_store(StateFile::in_dir(dir.path())).unwrap()
    }

    fn draft(name: &str, tier: Tier) -> TaskDraft {
        TaskDraft {
            name: name.to_string(),
            tier,
            ..Default::default()
        }
    }

    #[test]
    fn delete_cascades_edges() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        let a = app.create_task(draft("A", Tier::Min25)).unwrap().id;
        let b = app.create_task(draft("B", Tier::Min25)).unwrap().id;
        let c = app.create_task(draft("C", Tier::Min25)).unwrap().id;
        app.link(&a, &b).unwrap();
        app.link(&b, &c).unwrap();

        assert!(app.delete_task(&b).unwrap());
        assert!(app.graph().is_empty());
        assert!(!app.delete_task(&b).unwrap());
    }

    #[test]
    fn link_requires_existing_tasks() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        let a = app.create_task(draft("A", Tier::Min25)).unwrap().id;
        assert!(matches!(
            app.link(&a, "ghost"),
            Err(CoreError::Validation(ValidationError::TaskNotFound { .. }))
        ));
    }

    #[test]
    fn start_rejects_locked_and_unknown_tasks() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        let a = app.create_task(draft("A", Tier::Min25)).unwrap().id;
        let b = app.create_task(draft("B", Tier::Min50)).unwrap().id;
        app.link(&a, &b).unwrap();

        assert!(matches!(
            app.start_session(&b),
            Err(CoreError::Session(SessionError::Locked { .. }))
        ));
        assert!(matches!(
            app.start_session("ghost"),
            Err(CoreError::Session(SessionError::TaskNotFound { .. }))
        ));

        app.start_session(&a).unwrap();
        assert!(matches!(
            app.start_session(&a),
            Err(CoreError::Session(SessionError::AlreadyActive))
        ));
    }

    #[test]
    fn full_unlock_scenario() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        let a = app
            .create_task(TaskDraft {
                name: "A".to_string(),
                tier: Tier::Min25,
                processes: vec![
                    ProcessItem {
                        text: "focus".to_string(),
                        kind: ProcessKind::Positive,
                    },
                    ProcessItem {
                        text: "plan".to_string(),
                        kind: ProcessKind::Positive,
                    },
                ],
                ..Default::default()
            })
            .unwrap()
            .id;
        let b = app.create_task(draft("B", Tier::Min50)).unwrap().id;
        app.link(&a, &b).unwrap();

        assert!(app.is_locked(&b));
        assert!(!app.is_locked(&a));

        app.start_session(&a).unwrap();
        app.toggle_checklist_item(0).unwrap();
        app.toggle_checklist_item(1).unwrap();
        let outcome = app.end_session(SessionStatus::Complete).unwrap();
        assert_eq!(outcome.score, 100);
        assert!(app.tasks().get(&a).unwrap().session_completed);
        assert!(!app.is_locked(&b));

        // Debrief must be answered before the next session.
        assert!(matches!(
            app.start_session(&b),
            Err(CoreError::Session(SessionError::DebriefPending))
        ));
        let entry = app.resolve_objective(true).unwrap();
        assert_eq!(entry.task_id, a);
        assert!(entry.objective_achieved);
        assert!(app.tasks().get(&a).unwrap().objective_achieved);
        assert_eq!(app.log_stats().total_sessions, 1);

        app.start_session(&b).unwrap();
    }

    #[test]
    fn aborted_session_never_completes_the_task() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        let a = app.create_task(draft("A", Tier::Min25)).unwrap().id;
        app.start_session(&a).unwrap();
        let outcome = app.end_session(SessionStatus::Aborted).unwrap();
        assert_eq!(outcome.status, SessionStatus::Aborted);
        assert!(!app.tasks().get(&a).unwrap().session_completed);

        let entry = app.resolve_objective(false).unwrap();
        assert_eq!(entry.status, SessionStatus::Aborted);
        assert_eq!(app.log_stats().aborted_sessions, 1);
    }

    #[test]
    fn resolve_without_debrief_fails() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        assert!(matches!(
            app.resolve_objective(true),
            Err(CoreError::Session(SessionError::NoDebrief))
        ));
    }

    #[test]
    fn state_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let a;
        {
            let mut app = test_app(&dir);
            a = app.create_task(draft("A", Tier::Min75)).unwrap().id;
            app.set_audio_enabled(false).unwrap();
            app.start_session(&a).unwrap();
        }
        let app = test_app(&dir);
        assert_eq!(app.tasks().len(), 1);
        assert!(!app.settings().audio_enabled);
        assert_eq!(app.tasks().get(&a).unwrap().duration_minutes, 75);
        match app.session_snapshot() {
            Event::StateSnapshot { state, task_id, .. } => {
                assert_ne!(state, crate::session::SessionState::Idle);
                assert_eq!(task_id.as_deref(), Some(a.as_str()));
            }
            _ => panic!("expected StateSnapshot"),
        }
    }

    #[test]
    fn failed_import_leaves_state_intact() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.create_task(draft("Keep me", Tier::Min25)).unwrap();

        assert!(app.import_json(r#"{"orbits": "not-an-array"}"#).is_err());
        assert_eq!(app.tasks().len(), 1);
        assert_eq!(app.tasks().all()[0].name, "Keep me");
    }

    #[test]
    fn export_import_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        let a = app.create_task(draft("A", Tier::Min25)).unwrap().id;
        let b = app.create_task(draft("B", Tier::Min50)).unwrap().id;
        app.link(&a, &b).unwrap();
        let exported = app.export_json().unwrap();

        let dir2 = TempDir::new().unwrap();
        let mut other = test_app(&dir2);
        other.import_json(&exported).unwrap();
        assert_eq!(other.tasks().len(), 2);
        assert_eq!(other.graph().len(), 1);
        assert!(other.is_locked(&b));
    }

    #[test]
    fn clear_all_data_resets_everything() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        let a = app.create_task(draft("A", Tier::Min25)).unwrap().id;
        app.start_session(&a).unwrap();
        app.clear_all_data().unwrap();
        assert!(app.tasks().is_empty());
        assert!(app.graph().is_empty());
        assert!(app.logs().is_empty());

        let reopened = test_app(&dir);
        assert!(reopened.tasks().is_empty());
    }
}
