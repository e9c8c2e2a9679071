//! Audio cue setting carried in the state blob.

use clap::Subcommand;
use orbit_core::App;

use super::CliResult;

#[derive(Subcommand)]
pub enum AudioAction {
    /// Enable audio cues
    On,
    /// Disable audio cues
    Off,
    /// Show the current setting
    Status,
}

pub fn run(action: AudioAction) -> CliResult {
    let mut app = App::open()?;

    match action {
        AudioAction::On => {
            app.set_audio_enabled(true)?;
            println!("Audio enabled");
        }
        AudioAction::Off => {
            app.set_audio_enabled(false)?;
            println!("Audio disabled");
        }
        AudioAction::Status => {
            println!(
                "{}",
                if app.settings().audio_enabled {
                    "enabled"
                } else {
                    "disabled"
                }
            );
        }
    }

    Ok(())
}
