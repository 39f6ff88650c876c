//! Default paths for vaultlock components
//!
//! Paths are user-writable by default:
//! - Config: `$XDG_CONFIG_HOME/vaultlock/config.toml` or `~/.config/vaultlock/config.toml`
//! - Data: `$XDG_DATA_HOME/vaultlock` or `~/.local/share/vaultlock`

use std::path::PathBuf;

/// Environment variable for overriding the config file path
pub const VAULTLOCK_CONFIG_ENV: &str = "VAULTLOCK_CONFIG";

/// Application subdirectory name
const APP_DIR: &str = "vaultlock";

/// Config filename within the config directory
const CONFIG_FILENAME: &str = "config.toml";

/// Session database filename within the data directory
pub const SESSION_DB_FILENAME: &str = "session.db";

/// Get the default config file path.
///
/// Order of precedence:
/// 1. `$VAULTLOCK_CONFIG` environment variable (if set)
/// 2. `$XDG_CONFIG_HOME/vaultlock/config.toml` (if XDG_CONFIG_HOME is set)
/// 3. `~/.config/vaultlock/config.toml` (fallback)
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(VAULTLOCK_CONFIG_ENV) {
        return PathBuf::from(path);
    }

    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR).join(CONFIG_FILENAME);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join(CONFIG_FILENAME);
    }

    PathBuf::from("/tmp").join(APP_DIR).join(CONFIG_FILENAME)
}

/// Get the data directory without checking the `VAULTLOCK_DATA_DIR` env var.
/// Used for default values in configs; the command line reads the env var.
pub fn data_dir_without_env() -> PathBuf {
    if let Ok(data_home) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(data_home).join(APP_DIR);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(APP_DIR);
    }

    // Last resort
    PathBuf::from("/tmp").join(APP_DIR).join("data")
}
