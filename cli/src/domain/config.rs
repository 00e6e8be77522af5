//! Domain types and validators for appctl configuration.
//!
//! Pure functions only: no I/O, no filesystem access.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

pub const VALID_CONFIG_KEYS: &[&str] = &["server", "namespace", "token", "ssh"];

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.appctl/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the application broker, e.g. `https://broker.example.com`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    /// Default namespace applications are looked up in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// API token sent as a bearer credential.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Custom ssh executable. When set, `scp` prints a manual command instead
    /// of transferring.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh: Option<String>,
}

impl AppConfig {
    /// Sets `key` to `value`. An empty value clears the setting.
    ///
    /// # Errors
    ///
    /// Returns an error if the key or value is invalid.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_config_key(key)?;
        validate_config_value(key, value)?;

        let value = (!value.is_empty()).then(|| value.to_string());
        match key {
            "server" => self.server = value.map(|v| v.trim_end_matches('/').to_string()),
            "namespace" => self.namespace = value,
            "token" => self.token = value,
            "ssh" => self.ssh = value,
            _ => anyhow::bail!("Unknown setting: {key}"),
        }
        Ok(())
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<()> {
    if !VALID_CONFIG_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey {
            key: key.to_string(),
            valid: VALID_CONFIG_KEYS.join(", "),
        }
        .into());
    }
    Ok(())
}

/// Validates a configuration value for the given key.
///
/// # Errors
///
/// Returns an error if the value is not valid for the key.
pub fn validate_config_value(key: &str, value: &str) -> Result<()> {
    let invalid = |hint: &str| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        hint: hint.to_string(),
    };
    match key {
        "server" if !value.is_empty()
            && !(value.starts_with("https://") || value.starts_with("http://")) =>
        {
            Err(invalid("Server must be an http:// or https:// URL").into())
        }
        "namespace" if value.contains('/') || value.chars().any(char::is_whitespace) => {
            Err(invalid("Namespace must not contain '/' or whitespace").into())
        }
        _ => Ok(()),
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
