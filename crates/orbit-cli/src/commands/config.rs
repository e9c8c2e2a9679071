//! Configuration commands.

use clap::Subcommand;
use orbit_core::Config;

use super::CliResult;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a configuration value by dotted key
    Get {
        /// Key, e.g. audio.enabled
        key: String,
    },
    /// Set a configuration value
    Set {
        /// Key, e.g. audio.volume
        key: String,
        /// New value
        value: String,
    },
    /// List all configuration entries
    List,
}

pub fn run(action: ConfigAction) -> CliResult {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            println!("{key} = {value}");
        }
        ConfigAction::List => {
            let config = Config::load()?;
            for (key, value) in config.entries() {
                println!("{key} = {value}");
            }
        }
    }

    Ok(())
}
