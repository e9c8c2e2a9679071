//! Session engine: one timed, checklist-tracked run of a task.
//!
//! The engine is a wall-clock-based state machine. It does not use
//! internal threads -- the caller is responsible for calling `tick()`
//! periodically, and the whole engine serializes so a CLI can persist
//! the active session between invocations.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!   ^        |            |
//!   +---- end(status) ----+
//! ```
//!
//! At most one session is active at a time. The countdown decrements by
//! whole elapsed seconds and may go negative; reaching zero is
//! informational, termination is always an explicit `end`. Pausing
//! stops the countdown but not the wall-clock elapsed-time tracking
//! used for the session's actual duration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::events::Event;
use crate::log::SessionStatus;
use crate::task::{ProcessKind, Task};
use crate::tier::Tier;

/// Seconds remaining at which the one-time warning fires.
pub const WARNING_THRESHOLD_SECS: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Running,
    Paused,
}

/// One checklist entry cloned from the task template at session start.
/// Mutations here never touch the template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChecklistItem {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: ProcessKind,
    #[serde(rename = "isChecked")]
    pub checked: bool,
}

/// Handoff payload produced by `end`. The caller resolves the
/// objective-achieved question later and writes the history log entry;
/// the engine never writes the log itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionOutcome {
    pub task_id: String,
    pub task_name: String,
    pub tier: Tier,
    pub score: u8,
    pub status: SessionStatus,
    pub checklist: Vec<ChecklistItem>,
    pub planned_secs: i64,
    pub actual_secs: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ActiveSession {
    task_id: String,
    task_name: String,
    tier: Tier,
    started_at: DateTime<Utc>,
    planned_secs: i64,
    remaining_secs: i64,
    checklist: Vec<ChecklistItem>,
    paused: bool,
    /// Epoch seconds of the last countdown flush; only meaningful
    /// while running.
    last_tick_epoch_secs: u64,
    /// Whether the one-time threshold warning has fired.
    warned: bool,
}

/// Core session engine.
///
/// Operates on wall-clock deltas -- no internal thread. The caller is
/// responsible for calling `tick()` periodically.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionEngine {
    #[serde(default)]
    session: Option<ActiveSession>,
}

impl SessionEngine {
    pub fn new() -> Self {
        Self { session: None }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        match &self.session {
            None => SessionState::Idle,
            Some(s) if s.paused => SessionState::Paused,
            Some(_) => SessionState::Running,
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn task_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.task_id.as_str())
    }

    pub fn remaining_secs(&self) -> i64 {
        self.session.as_ref().map(|s| s.remaining_secs).unwrap_or(0)
    }

    pub fn checklist(&self) -> &[ChecklistItem] {
        self.session
            .as_ref()
            .map(|s| s.checklist.as_slice())
            .unwrap_or(&[])
    }

    /// Current integrity score; 100 when no session is active.
    pub fn score(&self) -> u8 {
        integrity_score(self.checklist())
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let s = self.session.as_ref();
        Event::StateSnapshot {
            state: self.state(),
            task_id: s.map(|s| s.task_id.clone()),
            task_name: s.map(|s| s.task_name.clone()),
            remaining_secs: s.map(|s| s.remaining_secs).unwrap_or(0),
            planned_secs: s.map(|s| s.planned_secs).unwrap_or(0),
            score: self.score(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a session on a task the caller has already resolved and
    /// lock-checked. Snapshots the checklist template with every item
    /// unchecked and starts the countdown.
    pub fn start(&mut self, task: &Task) -> Result<Event, SessionError> {
        if self.session.is_some() {
            return Err(SessionError::AlreadyActive);
        }
        let planned_secs = i64::from(task.duration_minutes) * 60;
        let now = Utc::now();
        self.session = Some(ActiveSession {
            task_id: task.id.clone(),
            task_name: task.name.clone(),
            tier: task.tier,
            started_at: now,
            planned_secs,
            remaining_secs: planned_secs,
            checklist: task
                .processes
                .iter()
                .map(|p| ChecklistItem {
                    text: p.text.clone(),
                    kind: p.kind,
                    checked: false,
                })
                .collect(),
            paused: false,
            last_tick_epoch_secs: now_epoch_secs(),
            warned: planned_secs <= WARNING_THRESHOLD_SECS,
        });
        Ok(Event::SessionStarted {
            task_id: task.id.clone(),
            task_name: task.name.clone(),
            tier: task.tier,
            planned_secs,
            at: now,
        })
    }

    /// Call periodically. Returns `Some(Event::TimeWarning)` once, when
    /// the countdown crosses the threshold from above.
    pub fn tick(&mut self) -> Option<Event> {
        let session = self.session.as_mut()?;
        if session.paused {
            return None;
        }
        flush_elapsed(session);
        if !session.warned && session.remaining_secs <= WARNING_THRESHOLD_SECS {
            session.warned = true;
            return Some(Event::TimeWarning {
                remaining_secs: session.remaining_secs,
                at: Utc::now(),
            });
        }
        None
    }

    /// Flip the paused flag. No-op (returns None) when idle.
    pub fn toggle_pause(&mut self) -> Option<Event> {
        let session = self.session.as_mut()?;
        if session.paused {
            session.paused = false;
            session.last_tick_epoch_secs = now_epoch_secs();
            Some(Event::SessionResumed {
                remaining_secs: session.remaining_secs,
                at: Utc::now(),
            })
        } else {
            flush_elapsed(session);
            session.paused = true;
            Some(Event::SessionPaused {
                remaining_secs: session.remaining_secs,
                at: Utc::now(),
            })
        }
    }

    /// Flip one checklist item. Out-of-range indices and idle state are
    /// ignored (returns None). Reports the recomputed score.
    pub fn toggle_checklist_item(&mut self, index: usize) -> Option<Event> {
        let session = self.session.as_mut()?;
        let item = session.checklist.get_mut(index)?;
        item.checked = !item.checked;
        let checked = item.checked;
        let score = integrity_score(&session.checklist);
        Some(Event::ChecklistToggled {
            index,
            checked,
            score,
            at: Utc::now(),
        })
    }

    /// Stop the countdown, compute the final score and the wall-clock
    /// actual duration, and return the handoff payload. The engine is
    /// back in `Idle` afterwards; an aborted session produces the same
    /// payload shape with its own status.
    pub fn end(&mut self, status: SessionStatus) -> Result<SessionOutcome, SessionError> {
        let mut session = self.session.take().ok_or(SessionError::NotActive)?;
        if !session.paused {
            flush_elapsed(&mut session);
        }
        let score = integrity_score(&session.checklist);
        let actual_secs = (Utc::now() - session.started_at).num_seconds().max(0);
        Ok(SessionOutcome {
            task_id: session.task_id,
            task_name: session.task_name,
            tier: session.tier,
            score,
            status,
            checklist: session.checklist,
            planned_secs: session.planned_secs,
            actual_secs,
        })
    }

    /// Shift the active session's clock anchors into the past, as if
    /// `secs` of wall-clock time had elapsed.
    #[cfg(test)]
    fn rewind_clock(&mut self, secs: u64) {
        if let Some(session) = self.session.as_mut() {
            session.last_tick_epoch_secs = session.last_tick_epoch_secs.saturating_sub(secs);
            session.started_at = session.started_at - chrono::Duration::seconds(secs as i64);
        }
    }
}

/// Consume whole elapsed wall-clock seconds since the last flush. The
/// countdown may go negative; there is no automatic termination.
fn flush_elapsed(session: &mut ActiveSession) {
    let now = now_epoch_secs();
    let elapsed = now.saturating_sub(session.last_tick_epoch_secs);
    if elapsed > 0 {
        session.remaining_secs -= elapsed as i64;
        session.last_tick_epoch_secs = now;
    }
}

fn now_epoch_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Integrity score for a checklist, 0-100.
///
/// Starts at 100. Each unchecked positive item costs its proportional
/// share of 100 points; each checked negative item costs a flat 15.
/// Rounded to the nearest integer and clamped at zero. An empty
/// checklist scores 100.
pub fn integrity_score(items: &[ChecklistItem]) -> u8 {
    let positives: Vec<&ChecklistItem> =
        items.iter().filter(|i| i.kind == ProcessKind::Positive).collect();

    let mut score = 100.0;
    if !positives.is_empty() {
        let unchecked = positives.iter().filter(|i| !i.checked).count();
        score -= unchecked as f64 / positives.len() as f64 * 100.0;
    }

    let checked_negatives = items
        .iter()
        .filter(|i| i.kind == ProcessKind::Negative && i.checked)
        .count();
    score -= checked_negatives as f64 * 15.0;

    score.round().max(0.0) as u8
}
