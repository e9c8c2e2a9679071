pub mod audio;
pub mod config;
pub mod data;
pub mod link;
pub mod log;
pub mod mission;
pub mod orbit;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;
