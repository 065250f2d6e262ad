// src/backend/key_file.rs
//! Key file backend
//!
//! Current format is base64 text of the 32 key bytes; the legacy format is
//! the 32 bytes written verbatim. Both are read, only base64 is written.

use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::enums::KeyFileFormat;
use crate::error::{Result, VaultError};
use crate::file_ops::{write_atomic, WriteMode};
use crate::key_ops::MasterKey;

/// What was found at the key path
#[derive(Debug)]
pub enum KeyFileState {
    Missing,
    Valid(MasterKey, KeyFileFormat),
    /// Exists but holds neither a base64 nor a raw 32-byte key
    Invalid,
}

/// Classify the bytes of a key file
pub fn parse_key_file(bytes: &[u8]) -> KeyFileState {
    let from_text = std::str::from_utf8(bytes)
        .ok()
        .and_then(MasterKey::from_base64);
    if let Some(key) = from_text {
        return KeyFileState::Valid(key, KeyFileFormat::Base64);
    }
    match MasterKey::from_slice(bytes) {
        Some(key) => KeyFileState::Valid(key, KeyFileFormat::Raw),
        None => KeyFileState::Invalid,
    }
}

pub fn read_key_file(path: &Path) -> io::Result<KeyFileState> {
    let bytes = match fs::read(path) {
        Ok(bytes) => Zeroizing::new(bytes),
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(KeyFileState::Missing),
        Err(err) => return Err(err),
    };
    Ok(parse_key_file(&bytes))
}

/// Persist `key` as base64 text, then lock the file down to the owner
///
/// A permission failure is logged, not returned: the key is already durable
/// and refusing it would lose data.
pub fn write_key_file(path: &Path, key: &MasterKey, mode: WriteMode) -> io::Result<()> {
    write_key_file_with(path, key, mode, restrict_permissions)
}

fn write_key_file_with(
    path: &Path,
    key: &MasterKey,
    mode: WriteMode,
    restrict: impl FnOnce(&Path) -> Result<()>,
) -> io::Result<()> {
    let encoded = key.to_base64();
    write_atomic(path, encoded.as_bytes(), mode, None)?;

    if let Err(err) = restrict(path) {
        warn!(path = %path.display(), error = %err, "key file permissions could not be restricted");
    }
    debug!(path = %path.display(), fingerprint = %key.fingerprint(), "key file written");
    Ok(())
}

/// Set owner read/write only; a no-op where POSIX modes do not exist
pub fn restrict_permissions(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        use crate::consts::KEY_FILE_MODE;

        fs::set_permissions(path, fs::Permissions::from_mode(KEY_FILE_MODE)).map_err(|source| {
            VaultError::Permission {
                path: path.to_path_buf(),
                source,
            }
        })?;
    }
    #[cfg(not(unix))]
    {
        debug!(path = %path.display(), "POSIX permissions unavailable on this platform");
    }
    Ok(())
}

/// Rewrite a legacy raw-format key file in the current base64 format
///
/// The key itself is unchanged. Returns `true` when a rewrite happened.
pub fn upgrade_legacy_key_file(path: &Path) -> Result<bool> {
    match read_key_file(path)? {
        KeyFileState::Valid(key, KeyFileFormat::Raw) => {
            write_key_file(path, &key, WriteMode::Replace)?;
            info!(path = %path.display(), fingerprint = %key.fingerprint(), "legacy key file upgraded to base64");
            Ok(true)
        }
        _ => Ok(false),
    }
}
