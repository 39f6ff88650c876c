//! Configuration validation

use crate::schema::{RawConfig, RawTimeout};
use std::time::Duration;
use thiserror::Error;
use vaultlock_api::TimeoutPolicy;

/// Numeric sentinels accepted for compatibility with older preference
/// values, where the timeout was always stored as a millisecond count.
const LEGACY_NEVER: i64 = -1;
const LEGACY_IMMEDIATELY: i64 = 0;
const LEGACY_SYSTEM_LOCK: i64 = -2;
const LEGACY_SYSTEM_SLEEP: i64 = -3;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Invalid timeout '{value}': {message}")]
    InvalidTimeout { value: String, message: String },

    #[error("Invalid data_dir: {0}")]
    InvalidDataDir(String),
}

/// Validate a raw configuration
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(timeout) = &config.vault.timeout {
        if let Err(e) = parse_timeout(timeout) {
            errors.push(e);
        }
    }

    if let Some(dir) = &config.vault.data_dir {
        if dir.as_os_str().is_empty() {
            errors.push(ValidationError::InvalidDataDir("path cannot be empty".into()));
        } else if dir.is_relative() {
            errors.push(ValidationError::InvalidDataDir(format!(
                "'{}' must be an absolute path",
                dir.display()
            )));
        }
    }

    errors
}

/// Resolve a raw timeout value into a policy
pub fn parse_timeout(raw: &RawTimeout) -> Result<TimeoutPolicy, ValidationError> {
    match raw {
        RawTimeout::Keyword(s) => parse_timeout_str(s),
        RawTimeout::Millis(ms) => timeout_from_millis(*ms),
    }
}

/// Parse a timeout given as text: a keyword or a millisecond count.
pub fn parse_timeout_str(value: &str) -> Result<TimeoutPolicy, ValidationError> {
    let trimmed = value.trim();

    match trimmed.to_ascii_lowercase().as_str() {
        "never" => return Ok(TimeoutPolicy::Never),
        "immediately" => return Ok(TimeoutPolicy::Immediately),
        "system_lock" => return Ok(TimeoutPolicy::OnSystemLock),
        "system_sleep" => return Ok(TimeoutPolicy::OnSystemSleep),
        _ => {}
    }

    match trimmed.parse::<i64>() {
        Ok(ms) => timeout_from_millis(ms),
        Err(_) => Err(ValidationError::InvalidTimeout {
            value: value.to_string(),
            message: "expected never, immediately, system_lock, system_sleep, or milliseconds"
                .into(),
        }),
    }
}

fn timeout_from_millis(ms: i64) -> Result<TimeoutPolicy, ValidationError> {
    match ms {
        LEGACY_NEVER => Ok(TimeoutPolicy::Never),
        LEGACY_IMMEDIATELY => Ok(TimeoutPolicy::Immediately),
        LEGACY_SYSTEM_LOCK => Ok(TimeoutPolicy::OnSystemLock),
        LEGACY_SYSTEM_SLEEP => Ok(TimeoutPolicy::OnSystemSleep),
        ms if ms > 0 => Ok(TimeoutPolicy::After(Duration::from_millis(ms as u64))),
        ms => Err(ValidationError::InvalidTimeout {
            value: ms.to_string(),
            message: "negative durations are not allowed".into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::RawVaultConfig;
    use std::path::PathBuf;

    #[test]
    fn test_parse_keywords() {
        assert_eq!(parse_timeout_str("never").unwrap(), TimeoutPolicy::Never);
        assert_eq!(
            parse_timeout_str("Immediately").unwrap(),
            TimeoutPolicy::Immediately
        );
        assert_eq!(
            parse_timeout_str("system_lock").unwrap(),
            TimeoutPolicy::OnSystemLock
        );
        assert_eq!(
            parse_timeout_str(" system_sleep ").unwrap(),
            TimeoutPolicy::OnSystemSleep
        );
    }

    #[test]
    fn test_parse_millis() {
        assert_eq!(
            parse_timeout(&RawTimeout::Millis(900_000)).unwrap(),
            TimeoutPolicy::After(Duration::from_secs(900))
        );
        // Preference values were historically stored as strings
        assert_eq!(
            parse_timeout_str("60000").unwrap(),
            TimeoutPolicy::After(Duration::from_secs(60))
        );
    }

    #[test]
    fn test_legacy_sentinels() {
        assert_eq!(parse_timeout(&RawTimeout::Millis(-1)).unwrap(), TimeoutPolicy::Never);
        assert_eq!(
            parse_timeout(&RawTimeout::Millis(0)).unwrap(),
            TimeoutPolicy::Immediately
        );
        assert_eq!(
            parse_timeout(&RawTimeout::Millis(-2)).unwrap(),
            TimeoutPolicy::OnSystemLock
        );
        assert_eq!(parse_timeout_str("-3").unwrap(), TimeoutPolicy::OnSystemSleep);
    }

    #[test]
    fn test_rejects_invalid() {
        assert!(matches!(
            parse_timeout_str("whenever"),
            Err(ValidationError::InvalidTimeout { .. })
        ));
        assert!(matches!(
            parse_timeout(&RawTimeout::Millis(-10)),
            Err(ValidationError::InvalidTimeout { .. })
        ));
    }

    #[test]
    fn test_validate_config_collects_errors() {
        let config = RawConfig {
            config_version: 1,
            vault: RawVaultConfig {
                timeout: Some(RawTimeout::Keyword("sometimes".into())),
                data_dir: Some(PathBuf::from("relative/dir")),
            },
        };

        let errors = validate_config(&config);
        assert_eq!(errors.len(), 2);
    }
}
