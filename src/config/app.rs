// src/config/app.rs
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::defaults::*;
use crate::error::{Result, VaultError};

pub const ENV_KEY_PATH: &str = "VAULTED_KEY_PATH";
pub const ENV_USE_CREDENTIAL_STORE: &str = "VAULTED_USE_CREDENTIAL_STORE";
pub const ENV_UPGRADE_LEGACY_KEY_FILE: &str = "VAULTED_UPGRADE_LEGACY_KEY_FILE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Key file backend location
    #[serde(default = "default_key_path")]
    pub key_path: PathBuf,

    /// Consult and update the OS credential store
    #[serde(default = "default_use_credential_store")]
    pub use_credential_store: bool,

    /// Rewrite a legacy raw key file as base64 when it is loaded
    #[serde(default = "default_upgrade_legacy_key_file")]
    pub upgrade_legacy_key_file: bool,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            key_path: default_key_path(),
            use_credential_store: default_use_credential_store(),
            upgrade_legacy_key_file: default_upgrade_legacy_key_file(),
        }
    }
}

impl VaultConfig {
    pub fn new(key_path: impl Into<PathBuf>) -> Self {
        Self {
            key_path: key_path.into(),
            ..Self::default()
        }
    }

    pub fn without_credential_store(mut self) -> Self {
        self.use_credential_store = false;
        self
    }

    pub fn with_legacy_upgrade(mut self) -> Self {
        self.upgrade_legacy_key_file = true;
        self
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Read a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            VaultError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), "vault config loaded");
        Ok(config)
    }

    /// Apply `VAULTED_*` environment variables on top of this config
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(path) = lookup(ENV_KEY_PATH).filter(|p| !p.is_empty()) {
            self.key_path = PathBuf::from(path);
        }
        if let Some(value) = lookup(ENV_USE_CREDENTIAL_STORE) {
            self.use_credential_store = parse_flag(ENV_USE_CREDENTIAL_STORE, &value)?;
        }
        if let Some(value) = lookup(ENV_UPGRADE_LEGACY_KEY_FILE) {
            self.upgrade_legacy_key_file = parse_flag(ENV_UPGRADE_LEGACY_KEY_FILE, &value)?;
        }
        Ok(self)
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(VaultError::Config(format!(
            "{name} must be a boolean, got {other:?}"
        ))),
    }
}
