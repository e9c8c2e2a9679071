use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::log::SessionStatus;
use crate::session::SessionState;
use crate::tier::Tier;

/// Every session state change produces an Event.
/// The CLI prints them; a GUI layer would poll for them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        task_id: String,
        task_name: String,
        tier: Tier,
        planned_secs: i64,
        at: DateTime<Utc>,
    },
    SessionPaused {
        remaining_secs: i64,
        at: DateTime<Utc>,
    },
    SessionResumed {
        remaining_secs: i64,
        at: DateTime<Utc>,
    },
    /// Countdown crossed the warning threshold from above (fires once).
    TimeWarning {
        remaining_secs: i64,
        at: DateTime<Utc>,
    },
    ChecklistToggled {
        index: usize,
        checked: bool,
        score: u8,
        at: DateTime<Utc>,
    },
    SessionEnded {
        task_id: String,
        status: SessionStatus,
        score: u8,
        actual_secs: i64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: SessionState,
        task_id: Option<String>,
        task_name: Option<String>,
        remaining_secs: i64,
        planned_secs: i64,
        score: u8,
        at: DateTime<Utc>,
    },
}
