//! Session control commands.
//!
//! The engine has no internal thread; `status` flushes elapsed
//! wall-clock time into the persisted countdown on each call.

use clap::Subcommand;
use orbit_core::{App, SessionStatus};

use super::CliResult;

#[derive(Subcommand)]
pub enum MissionAction {
    /// Start a session on an unlocked task
    Start {
        /// Task ID
        id: String,
    },
    /// Tick the countdown and print the session state as JSON
    Status,
    /// Toggle pause on the active session
    Pause,
    /// Toggle a checklist item by index
    Check {
        /// Zero-based checklist index
        index: usize,
    },
    /// End the session as completed (unlocks dependent tasks)
    Complete,
    /// End the session as aborted
    Abort,
    /// Answer the post-session objective question
    Answer {
        /// "yes" if the objective was achieved, otherwise "no"
        achieved: String,
    },
}

pub fn run(action: MissionAction) -> CliResult {
    let mut app = App::open()?;

    match action {
        MissionAction::Start { id } => {
            let event = app.start_session(&id)?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        MissionAction::Status => {
            if let Some(warning) = app.tick()? {
                println!("{}", serde_json::to_string_pretty(&warning)?);
            }
            println!("{}", serde_json::to_string_pretty(&app.session_snapshot())?);
            if let Some(pending) = app.pending_debrief() {
                eprintln!(
                    "debrief pending for '{}'; run `mission answer yes|no`",
                    pending.task_name
                );
            }
        }
        MissionAction::Pause => match app.toggle_pause()? {
            Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
            None => return Err("no active session".into()),
        },
        MissionAction::Check { index } => match app.toggle_checklist_item(index)? {
            Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
            None => return Err("no active session or index out of range".into()),
        },
        MissionAction::Complete => {
            app.tick()?;
            let outcome = app.end_session(SessionStatus::Complete)?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            eprintln!("objective achieved? run `mission answer yes|no`");
        }
        MissionAction::Abort => {
            app.tick()?;
            let outcome = app.end_session(SessionStatus::Aborted)?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            eprintln!("objective achieved? run `mission answer yes|no`");
        }
        MissionAction::Answer { achieved } => {
            let achieved = match achieved.as_str() {
                "yes" | "y" | "true" => true,
                "no" | "n" | "false" => false,
                other => return Err(format!("expected yes or no, got '{other}'").into()),
            };
            let entry = app.resolve_objective(achieved)?;
            println!("{}", serde_json::to_string_pretty(&entry)?);
        }
    }

    Ok(())
}
