//! Path helpers for formpilot's data directory.

use std::path::PathBuf;

/// Base data directory (~/.formpilot)
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .expect("failed to locate home directory")
        .join(".formpilot")
}

/// Config file location
pub fn config_path() -> PathBuf {
    data_dir().join("config.json")
}
