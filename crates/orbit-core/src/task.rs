//! Task ("orbit") records and the in-memory task store.
//!
//! Wire field names follow the persisted blob schema (`isSessionCompleted`,
//! `createdAt`, ...), so a state file written by the original web client
//! loads unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::tier::Tier;

/// Default canvas placement for a new task.
pub const DEFAULT_X: f64 = 100.0;
pub const DEFAULT_Y: f64 = 100.0;
/// Default and clamp range for the view-only size hint.
pub const DEFAULT_SIZE: u32 = 140;
pub const MIN_SIZE: u32 = 80;
pub const MAX_SIZE: u32 = 250;

/// Checklist item kind: a habit to do vs. a habit to avoid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProcessKind {
    Positive,
    Negative,
}

/// One entry of a task's checklist template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProcessItem {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: ProcessKind,
}

/// A user-defined unit of work with a time tier and optional checklist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub objective: String,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    pub tier: Tier,
    /// Denormalized from the tier; kept in sync on tier change.
    #[serde(rename = "duration")]
    pub duration_minutes: u32,
    #[serde(default)]
    pub processes: Vec<ProcessItem>,
    /// View-only placement hints.
    #[serde(default = "default_x")]
    pub x: f64,
    #[serde(default = "default_y")]
    pub y: f64,
    #[serde(default = "default_size")]
    pub size: u32,
    #[serde(rename = "isSessionCompleted", default)]
    pub session_completed: bool,
    #[serde(rename = "isObjectiveAchieved", default)]
    pub objective_achieved: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

fn default_x() -> f64 {
    DEFAULT_X
}

fn default_y() -> f64 {
    DEFAULT_Y
}

fn default_size() -> u32 {
    DEFAULT_SIZE
}

/// Input for creating a task.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub name: String,
    pub objective: String,
    pub deadline: Option<DateTime<Utc>>,
    pub tier: Tier,
    pub processes: Vec<ProcessItem>,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

/// Partial update; only provided fields are merged.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub objective: Option<String>,
    pub deadline: Option<Option<DateTime<Utc>>>,
    pub tier: Option<Tier>,
    pub processes: Option<Vec<ProcessItem>>,
}

/// In-memory collection of tasks.
///
/// Edge cascade on deletion is orchestrated by the application owner,
/// which also holds the dependency graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    pub fn all(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Create a new task. Requires a non-empty name and non-empty
    /// checklist item texts; the duration is denormalized from the tier.
    pub fn create(&mut self, draft: TaskDraft) -> Result<Task, ValidationError> {
        if draft.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if draft.processes.iter().any(|p| p.text.trim().is_empty()) {
            return Err(ValidationError::EmptyProcessText);
        }

        let task = Task {
            id: Uuid::new_v4().to_string(),
            name: draft.name,
            objective: draft.objective,
            deadline: draft.deadline,
            tier: draft.tier,
            duration_minutes: draft.tier.duration_minutes(),
            processes: draft.processes,
            x: draft.x.unwrap_or(DEFAULT_X),
            y: draft.y.unwrap_or(DEFAULT_Y),
            size: DEFAULT_SIZE,
            session_completed: false,
            objective_achieved: false,
            created_at: Utc::now(),
        };
        self.tasks.push(task.clone());
        Ok(task)
    }

    /// Merge provided fields into an existing task. A tier change
    /// recomputes the denormalized duration. Validation happens before
    /// anything is touched, so a rejected patch applies nothing.
    pub fn update(&mut self, id: &str, patch: TaskPatch) -> Result<Task, ValidationError> {
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                return Err(ValidationError::EmptyName);
            }
        }
        if let Some(processes) = &patch.processes {
            if processes.iter().any(|p| p.text.trim().is_empty()) {
                return Err(ValidationError::EmptyProcessText);
            }
        }
        let task = self
            .get_mut(id)
            .ok_or_else(|| ValidationError::TaskNotFound { id: id.to_string() })?;

        if let Some(name) = patch.name {
            task.name = name;
        }
        if let Some(objective) = patch.objective {
            task.objective = objective;
        }
        if let Some(deadline) = patch.deadline {
            task.deadline = deadline;
        }
        if let Some(tier) = patch.tier {
            task.tier = tier;
            task.duration_minutes = tier.duration_minutes();
        }
        if let Some(processes) = patch.processes {
            task.processes = processes;
        }
        Ok(task.clone())
    }

    /// Update the view-only placement hint.
    pub fn update_position(&mut self, id: &str, x: f64, y: f64) -> bool {
        match self.get_mut(id) {
            Some(task) => {
                task.x = x;
                task.y = y;
                true
            }
            None => false,
        }
    }

    /// Update the view-only size hint, clamped to the allowed range.
    pub fn update_size(&mut self, id: &str, size: u32) -> bool {
        match self.get_mut(id) {
            Some(task) => {
                task.size = size.clamp(MIN_SIZE, MAX_SIZE);
                true
            }
            None => false,
        }
    }

    /// Remove a task. Returns false if the id is unknown.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    /// One-way flag: a completed session unlocks dependent tasks.
    /// Idempotent; only `reset_all_progress` clears it.
    pub fn mark_session_completed(&mut self, id: &str) -> bool {
        match self.get_mut(id) {
            Some(task) => {
                task.session_completed = true;
                true
            }
            None => false,
        }
    }

    /// One-way flag set from the post-session debrief answer.
    pub fn mark_objective_achieved(&mut self, id: &str) -> bool {
        match self.get_mut(id) {
            Some(task) => {
                task.objective_achieved = true;
                true
            }
            None => false,
        }
    }

    /// Clear both progress flags on every task so the whole graph can
    /// be replayed. Idempotent.
    pub fn reset_all_progress(&mut self) {
        for task in &mut self.tasks {
            task.session_completed = false;
            task.objective_achieved = false;
        }
    }

    /// Soft deletion guard: true when deleting loses nothing worth a
    /// stronger confirmation. The store itself deletes unconditionally;
    /// the caller decides whether to ask.
    pub fn can_delete_freely(&self, id: &str) -> bool {
        match self.get(id) {
            Some(task) => {
                task.objective_achieved
                    || task.objective.trim().is_empty()
                    || task.session_completed
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, tier: Tier) -> TaskDraft {
        TaskDraft {
            name: name.to_string(),
            tier,
            ..Default::default()
        }
    }

    #[test]
    fn create_denormalizes_duration_and_defaults() {
        let mut store = TaskStore::default();
        let task = store.create(draft("Deep work", Tier::Min50)).unwrap();
        assert_eq!(task.duration_minutes, 50);
        assert_eq!(task.size, DEFAULT_SIZE);
        assert!(!task.session_completed);
        assert!(!task.objective_achieved);
    }

    #[test]
    fn create_rejects_empty_name() {
        let mut store = TaskStore::default();
        assert_eq!(
            store.create(draft("   ", Tier::Min25)).unwrap_err(),
            ValidationError::EmptyName
        );
        assert!(store.is_empty());
    }

    #[test]
    fn update_tier_recomputes_duration() {
        let mut store = TaskStore::default();
        let id = store.create(draft("A", Tier::Min25)).unwrap().id;
        let task = store
            .update(
                &id,
                TaskPatch {
                    tier: Some(Tier::Infinity),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(task.duration_minutes, 1440);
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let mut store = TaskStore::default();
        let err = store.update("nope", TaskPatch::default()).unwrap_err();
        assert_eq!(err, ValidationError::TaskNotFound { id: "nope".into() });
    }

    #[test]
    fn delete_reports_whether_anything_was_removed() {
        let mut store = TaskStore::default();
        let id = store.create(draft("A", Tier::Min25)).unwrap().id;
        assert!(store.delete(&id));
        assert!(!store.delete(&id));
    }

    #[test]
    fn progress_flags_are_one_way_and_idempotent() {
        let mut store = TaskStore::default();
        let id = store.create(draft("A", Tier::Min25)).unwrap().id;
        assert!(store.mark_session_completed(&id));
        assert!(store.mark_session_completed(&id));
        assert!(store.get(&id).unwrap().session_completed);

        store.reset_all_progress();
        assert!(!store.get(&id).unwrap().session_completed);
        store.reset_all_progress(); // idempotent
    }

    #[test]
    fn size_hint_is_clamped() {
        let mut store = TaskStore::default();
        let id = store.create(draft("A", Tier::Min25)).unwrap().id;
        store.update_size(&id, 10_000);
        assert_eq!(store.get(&id).unwrap().size, MAX_SIZE);
        store.update_size(&id, 1);
        assert_eq!(store.get(&id).unwrap().size, MIN_SIZE);
    }

    #[test]
    fn delete_guard_policy() {
        let mut store = TaskStore::default();

        // No objective set: freely deletable.
        let plain = store.create(draft("A", Tier::Min25)).unwrap().id;
        assert!(store.can_delete_freely(&plain));

        // Objective set, nothing achieved: guarded.
        let guarded = store
            .create(TaskDraft {
                name: "B".into(),
                objective: "ship it".into(),
                tier: Tier::Min25,
                ..Default::default()
            })
            .unwrap()
            .id;
        assert!(!store.can_delete_freely(&guarded));

        // Completed session lifts the guard.
        store.mark_session_completed(&guarded);
        assert!(store.can_delete_freely(&guarded));

        // Unknown id is never freely deletable.
        assert!(!store.can_delete_freely("missing"));
    }

    #[test]
    fn wire_format_matches_original_schema() {
        let mut store = TaskStore::default();
        let id = store.create(draft("A", Tier::Min25)).unwrap().id;
        let value = serde_json::to_value(store.get(&id).unwrap()).unwrap();
        assert!(value.get("isSessionCompleted").is_some());
        assert!(value.get("createdAt").is_some());
        assert_eq!(value["tier"], "25");
        assert_eq!(value["duration"], 25);
    }
}
