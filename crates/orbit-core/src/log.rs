//! History log: capped, newest-first record of past sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::{ChecklistItem, SessionOutcome};
use crate::tier::Tier;

/// Maximum number of retained entries; the oldest are silently dropped.
pub const MAX_ENTRIES: usize = 100;

/// How a session ended.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionStatus {
    Complete,
    Aborted,
}

/// Immutable snapshot written when a session's debrief is resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    #[serde(rename = "orbitId")]
    pub task_id: String,
    #[serde(rename = "orbitName")]
    pub task_name: String,
    pub tier: Tier,
    pub score: u8,
    pub status: SessionStatus,
    #[serde(rename = "objectiveAchieved", default)]
    pub objective_achieved: bool,
    #[serde(rename = "processesSnapshot", default)]
    pub checklist_snapshot: Vec<ChecklistItem>,
    /// Wall-clock seconds actually spent in the session.
    #[serde(rename = "sessionDuration")]
    pub actual_secs: i64,
    #[serde(rename = "plannedDuration")]
    pub planned_secs: i64,
    pub timestamp: DateTime<Utc>,
}

/// Aggregate counters over the log.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogStats {
    pub total_sessions: usize,
    pub completed_sessions: usize,
    pub aborted_sessions: usize,
    pub objectives_achieved: usize,
    /// Mean score rounded to the nearest integer; 0 when the log is empty.
    pub average_score: u32,
}

/// Ordered sequence of log entries, newest first, capped at
/// [`MAX_ENTRIES`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLog {
    entries: Vec<LogEntry>,
}

impl HistoryLog {
    pub fn new(entries: Vec<LogEntry>) -> Self {
        Self { entries }
    }

    pub fn all(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build an entry from a session outcome and the debrief answer,
    /// assign it an id and timestamp, prepend it, and truncate to the
    /// cap by dropping the oldest entries.
    pub fn add(&mut self, outcome: &SessionOutcome, objective_achieved: bool) -> &LogEntry {
        let entry = LogEntry {
            id: Uuid::new_v4().to_string(),
            task_id: outcome.task_id.clone(),
            task_name: outcome.task_name.clone(),
            tier: outcome.tier,
            score: outcome.score,
            status: outcome.status,
            objective_achieved,
            checklist_snapshot: outcome.checklist.clone(),
            actual_secs: outcome.actual_secs,
            planned_secs: outcome.planned_secs,
            timestamp: Utc::now(),
        };
        self.entries.insert(0, entry);
        self.entries.truncate(MAX_ENTRIES);
        &self.entries[0]
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries for one task, newest first.
    pub fn get_by_task(&self, task_id: &str) -> Vec<&LogEntry> {
        self.entries.iter().filter(|e| e.task_id == task_id).collect()
    }

    pub fn stats(&self) -> LogStats {
        if self.entries.is_empty() {
            return LogStats::default();
        }
        let completed = self
            .entries
            .iter()
            .filter(|e| e.status == SessionStatus::Complete)
            .count();
        let achieved = self.entries.iter().filter(|e| e.objective_achieved).count();
        let total_score: u32 = self.entries.iter().map(|e| u32::from(e.score)).sum();
        LogStats {
            total_sessions: self.entries.len(),
            completed_sessions: completed,
            aborted_sessions: self.entries.len() - completed,
            objectives_achieved: achieved,
            average_score: (total_score as f64 / self.entries.len() as f64).round() as u32,
        }
    }
}
