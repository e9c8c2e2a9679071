//! Dependency link commands.

use clap::Subcommand;
use orbit_core::{App, ToggleOutcome};

use super::CliResult;

#[derive(Subcommand)]
pub enum LinkAction {
    /// Create a prerequisite link (target unlocks when source completes)
    Add {
        /// Source task ID (the prerequisite)
        source: String,
        /// Target task ID (the gated task)
        target: String,
    },
    /// Remove the link between two tasks, in either orientation
    Remove {
        /// One endpoint task ID
        a: String,
        /// Other endpoint task ID
        b: String,
    },
    /// Create the link if absent, remove it if present
    Toggle {
        /// Source task ID
        source: String,
        /// Target task ID
        target: String,
    },
    /// List all links
    List,
}

pub fn run(action: LinkAction) -> CliResult {
    let mut app = App::open()?;

    match action {
        LinkAction::Add { source, target } => {
            let edge = app.link(&source, &target)?;
            println!("{}", serde_json::to_string_pretty(&edge)?);
        }
        LinkAction::Remove { a, b } => {
            if app.unlink(&a, &b)? {
                println!("Link removed");
            } else {
                return Err("no link between those tasks".into());
            }
        }
        LinkAction::Toggle { source, target } => {
            let outcome = app.toggle_link(&source, &target)?;
            match outcome {
                ToggleOutcome::Created => println!("Link created"),
                ToggleOutcome::Removed => println!("Link removed"),
            }
        }
        LinkAction::List => {
            println!("{}", serde_json::to_string_pretty(app.graph().all())?);
        }
    }

    Ok(())
}
