// src/config/defaults.rs
use std::path::PathBuf;

use crate::consts::{DEFAULT_APP_DIR, DEFAULT_KEY_FILE_NAME};

/// `<local data dir>/vaulted/vault_key.key`, or `./vault_key.key` when the
/// platform has no data dir
pub fn default_key_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join(DEFAULT_APP_DIR).join(DEFAULT_KEY_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_KEY_FILE_NAME))
}

pub fn default_use_credential_store() -> bool {
    true
}

pub fn default_upgrade_legacy_key_file() -> bool {
    false
}
