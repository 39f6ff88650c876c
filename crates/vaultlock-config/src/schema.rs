//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Vault session settings
    #[serde(default)]
    pub vault: RawVaultConfig,
}

/// Vault session settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawVaultConfig {
    /// Timeout policy: "never", "immediately", "system_lock", "system_sleep",
    /// or a positive number of milliseconds
    pub timeout: Option<RawTimeout>,

    /// Data directory for the session store
    pub data_dir: Option<PathBuf>,
}

/// Timeout as written in the config file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawTimeout {
    Keyword(String),
    Millis(i64),
}
