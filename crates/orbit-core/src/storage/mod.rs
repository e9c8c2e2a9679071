mod config;
mod state;

pub use config::{AudioConfig, Config};
pub use state::{
    parse_import, ExportPayload, ImportedData, PersistedState, RuntimeState, Settings,
    StateFile, STORAGE_VERSION,
};

use std::path::PathBuf;

use crate::error::StorageError;

/// Returns `~/.config/orbit[-dev]/` based on ORBIT_ENV.
///
/// Set ORBIT_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("ORBIT_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("orbit-dev")
    } else {
        base_dir.join("orbit")
    };

    std::fs::create_dir_all(&dir).map_err(|e| StorageError::DataDir(e.to_string()))?;
    Ok(dir)
}
