// src/consts.rs
//! Shared constants: wire layout, backend identifiers and defaults

/// Master key length in bytes (AES-256)
pub const KEY_LEN: usize = 32;

/// AES-GCM nonce length in bytes
pub const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag length in bytes
pub const TAG_LEN: usize = 16;

/// Bytes a blob carries on top of its plaintext: `nonce ‖ … ‖ tag`
pub const BLOB_OVERHEAD: usize = NONCE_LEN + TAG_LEN;

/// Credential-store service identifier for the master key entry
pub const CREDENTIAL_SERVICE: &str = "vaulted_core";

/// Credential-store account identifier for the master key entry
pub const CREDENTIAL_ACCOUNT: &str = "vault_master_key";

/// File name used when no key path is configured
pub const DEFAULT_KEY_FILE_NAME: &str = "vault_key.key";

/// Application directory under the platform data dir
pub const DEFAULT_APP_DIR: &str = "vaulted";

/// Owner read/write only
pub const KEY_FILE_MODE: u32 = 0o600;

/// Prefix for temporary files created next to their final destination
pub const TEMP_FILE_PREFIX: &str = ".vaulted-tmp-";

/// BLAKE3 derive-key context for key fingerprints
// Changing this changes every fingerprint ever logged
pub const FINGERPRINT_CONTEXT: &str = "vaulted-core 2025 master key fingerprint";

/// Number of fingerprint bytes rendered as hex
pub const FINGERPRINT_LEN: usize = 8;
