//! Validated configuration structures

use crate::schema::{RawConfig, RawVaultConfig};
use crate::validation::parse_timeout;
use std::path::PathBuf;
use std::time::Duration;
use vaultlock_api::TimeoutPolicy;
use vaultlock_util::data_dir_without_env;

/// Timeout used when the config does not set one (15 minutes)
pub const DEFAULT_TIMEOUT: TimeoutPolicy = TimeoutPolicy::After(Duration::from_secs(15 * 60));

/// Validated configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub vault: VaultConfig,
}

impl Config {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        Self {
            vault: VaultConfig::from_raw(raw.vault),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_raw(RawConfig {
            config_version: crate::CURRENT_CONFIG_VERSION,
            vault: RawVaultConfig::default(),
        })
    }
}

/// Vault session configuration
#[derive(Debug, Clone)]
pub struct VaultConfig {
    pub timeout: TimeoutPolicy,
    pub data_dir: PathBuf,
}

impl VaultConfig {
    fn from_raw(raw: RawVaultConfig) -> Self {
        Self {
            timeout: raw
                .timeout
                .as_ref()
                .and_then(|t| parse_timeout(t).ok())
                .unwrap_or(DEFAULT_TIMEOUT),
            data_dir: raw.data_dir.unwrap_or_else(data_dir_without_env),
        }
    }
}
