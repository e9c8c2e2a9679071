//! Task management commands.

use chrono::{DateTime, Utc};
use clap::Subcommand;
use orbit_core::{App, ProcessItem, ProcessKind, TaskDraft, TaskPatch, Tier};

use super::CliResult;

#[derive(Subcommand)]
pub enum OrbitAction {
    /// Create a new task
    Create {
        /// Task name
        name: String,
        /// Objective free text
        #[arg(long, default_value = "")]
        objective: String,
        /// Deadline (RFC 3339, e.g. 2026-09-01T12:00:00Z)
        #[arg(long)]
        deadline: Option<DateTime<Utc>>,
        /// Tier key: 25, 50, 75 or infinity
        #[arg(long, default_value = "25")]
        tier: String,
        /// Checklist habit to do (repeatable)
        #[arg(long = "do")]
        do_items: Vec<String>,
        /// Checklist habit to avoid (repeatable)
        #[arg(long = "avoid")]
        avoid_items: Vec<String>,
        /// Canvas x position
        #[arg(long)]
        x: Option<f64>,
        /// Canvas y position
        #[arg(long)]
        y: Option<f64>,
    },
    /// List all tasks with their lock state
    List,
    /// Get task details
    Get {
        /// Task ID
        id: String,
    },
    /// Update a task
    Update {
        /// Task ID
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New objective
        #[arg(long)]
        objective: Option<String>,
        /// New deadline (RFC 3339)
        #[arg(long)]
        deadline: Option<DateTime<Utc>>,
        /// Clear the deadline
        #[arg(long, conflicts_with = "deadline")]
        no_deadline: bool,
        /// New tier key (recomputes the duration)
        #[arg(long)]
        tier: Option<String>,
        /// Replace the checklist: habits to do (repeatable)
        #[arg(long = "do")]
        do_items: Vec<String>,
        /// Replace the checklist: habits to avoid (repeatable)
        #[arg(long = "avoid")]
        avoid_items: Vec<String>,
        /// New x position
        #[arg(long)]
        x: Option<f64>,
        /// New y position
        #[arg(long)]
        y: Option<f64>,
        /// New size hint
        #[arg(long)]
        size: Option<u32>,
    },
    /// Delete a task and its links
    Delete {
        /// Task ID
        id: String,
        /// Confirm deletion of a task with an unmet objective
        #[arg(long)]
        yes: bool,
    },
    /// Clear session/objective progress on every task
    ResetProgress {
        /// Confirm the bulk reset
        #[arg(long)]
        yes: bool,
    },
}

fn parse_tier(key: &str) -> Result<Tier, String> {
    Tier::from_key(key).ok_or_else(|| format!("unknown tier '{key}' (use 25, 50, 75 or infinity)"))
}

fn processes(do_items: Vec<String>, avoid_items: Vec<String>) -> Vec<ProcessItem> {
    do_items
        .into_iter()
        .map(|text| ProcessItem {
            text,
            kind: ProcessKind::Positive,
        })
        .chain(avoid_items.into_iter().map(|text| ProcessItem {
            text,
            kind: ProcessKind::Negative,
        }))
        .collect()
}

pub fn run(action: OrbitAction) -> CliResult {
    let mut app = App::open()?;

    match action {
        OrbitAction::Create {
            name,
            objective,
            deadline,
            tier,
            do_items,
            avoid_items,
            x,
            y,
        } => {
            let task = app.create_task(TaskDraft {
                name,
                objective,
                deadline,
                tier: parse_tier(&tier)?,
                processes: processes(do_items, avoid_items),
                x,
                y,
            })?;
            println!("Task created: {}", task.id);
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        OrbitAction::List => {
            let rows: Vec<serde_json::Value> = app
                .tasks()
                .all()
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "id": t.id,
                        "name": t.name,
                        "tier": t.tier,
                        "duration": t.duration_minutes,
                        "locked": app.is_locked(&t.id),
                        "isSessionCompleted": t.session_completed,
                        "isObjectiveAchieved": t.objective_achieved,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OrbitAction::Get { id } => match app.tasks().get(&id) {
            Some(task) => println!("{}", serde_json::to_string_pretty(task)?),
            None => return Err(format!("task '{id}' not found").into()),
        },
        OrbitAction::Update {
            id,
            name,
            objective,
            deadline,
            no_deadline,
            tier,
            do_items,
            avoid_items,
            x,
            y,
            size,
        } => {
            let new_deadline = if no_deadline {
                Some(None)
            } else {
                deadline.map(Some)
            };
            let new_processes = if do_items.is_empty() && avoid_items.is_empty() {
                None
            } else {
                Some(processes(do_items, avoid_items))
            };
            let task = app.update_task(
                &id,
                TaskPatch {
                    name,
                    objective,
                    deadline: new_deadline,
                    tier: tier.as_deref().map(parse_tier).transpose()?,
                    processes: new_processes,
                },
            )?;
            if let (Some(x), Some(y)) = (x, y) {
                app.move_task(&id, x, y)?;
            }
            if let Some(size) = size {
                app.resize_task(&id, size)?;
            }
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        OrbitAction::Delete { id, yes } => {
            if !yes && app.tasks().get(&id).is_some() && !app.can_delete_freely(&id) {
                return Err(
                    "task has an unmet objective; pass --yes to delete it anyway".into(),
                );
            }
            if app.delete_task(&id)? {
                println!("Task deleted: {id}");
            } else {
                return Err(format!("task '{id}' not found").into());
            }
        }
        OrbitAction::ResetProgress { yes } => {
            if !yes {
                return Err("this clears all progress flags; pass --yes to confirm".into());
            }
            app.reset_all_progress()?;
            println!("Progress reset on {} task(s)", app.tasks().len());
        }
    }

    Ok(())
}
