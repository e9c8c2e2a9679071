//! State blob import/export and reset.

use std::path::PathBuf;

use clap::Subcommand;
use orbit_core::App;

use super::CliResult;

#[derive(Subcommand)]
pub enum DataAction {
    /// Export tasks, links and logs as JSON
    Export {
        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Import a previously exported JSON payload (replaces all data)
    Import {
        /// Path to the JSON file
        file: PathBuf,
    },
    /// Delete all tasks, links, logs and persisted files
    Clear {
        /// Confirm wiping everything
        #[arg(long)]
        yes: bool,
    },
}

pub fn run(action: DataAction) -> CliResult {
    let mut app = App::open()?;

    match action {
        DataAction::Export { output } => {
            let json = app.export_json()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    println!("Exported to {}", path.display());
                }
                None => println!("{json}"),
            }
        }
        DataAction::Import { file } => {
            let json = std::fs::read_to_string(&file)?;
            app.import_json(&json)?;
            println!(
                "Imported {} task(s), {} link(s), {} log entrie(s)",
                app.tasks().len(),
                app.graph().len(),
                app.logs().len()
            );
        }
        DataAction::Clear { yes } => {
            if !yes {
                return Err("this wipes all data; pass --yes to confirm".into());
            }
            app.clear_all_data()?;
            println!("All data cleared");
        }
    }

    Ok(())
}
