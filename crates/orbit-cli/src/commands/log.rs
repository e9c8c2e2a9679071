//! History log commands.

use clap::Subcommand;
use orbit_core::App;

use super::CliResult;

#[derive(Subcommand)]
pub enum LogAction {
    /// List log entries, newest first
    List {
        /// Only entries for this task ID
        #[arg(long)]
        task_id: Option<String>,
    },
    /// Aggregate statistics over the log
    Stats,
    /// Delete every log entry
    Clear {
        /// Confirm clearing the log
        #[arg(long)]
        yes: bool,
    },
}

pub fn run(action: LogAction) -> CliResult {
    let mut app = App::open()?;

    match action {
        LogAction::List { task_id } => match task_id {
            Some(id) => {
                println!("{}", serde_json::to_string_pretty(&app.logs().get_by_task(&id))?)
            }
            None => println!("{}", serde_json::to_string_pretty(app.logs().all())?),
        },
        LogAction::Stats => {
            println!("{}", serde_json::to_string_pretty(&app.log_stats())?);
        }
        LogAction::Clear { yes } => {
            if !yes {
                return Err("this deletes the whole history; pass --yes to confirm".into());
            }
            app.clear_logs()?;
            println!("Log cleared");
        }
    }

    Ok(())
}
