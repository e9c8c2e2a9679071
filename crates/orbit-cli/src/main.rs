use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "orbit-cli", version, about = "Orbit CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Task (orbit) management
    Orbit {
        #[command(subcommand)]
        action: commands::orbit::OrbitAction,
    },
    /// Dependency links between tasks
    Link {
        #[command(subcommand)]
        action: commands::link::LinkAction,
    },
    /// Active session control
    Mission {
        #[command(subcommand)]
        action: commands::mission::MissionAction,
    },
    /// Session history and statistics
    Log {
        #[command(subcommand)]
        action: commands::log::LogAction,
    },
    /// Import, export and reset of the state blob
    Data {
        #[command(subcommand)]
        action: commands::data::DataAction,
    },
    /// Audio cue setting
    Audio {
        #[command(subcommand)]
        action: commands::audio::AudioAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Orbit { action } => commands::orbit::run(action),
        Commands::Link { action } => commands::link::run(action),
        Commands::Mission { action } => commands::mission::run(action),
        Commands::Log { action } => commands::log::run(action),
        Commands::Data { action } => commands::data::run(action),
        Commands::Audio { action } => commands::audio::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
