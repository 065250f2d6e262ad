// src/file_ops.rs
//! File-level encryption/decryption operations
//!
//! This module handles encryption and decryption with file I/O,
//! building on the pure crypto primitives from crypto/. Whole files are
//! loaded into memory; every write goes through a temporary file in the
//! destination directory followed by a rename, so readers never observe a
//! half-written file.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use zeroize::Zeroizing;

use crate::consts::TEMP_FILE_PREFIX;
use crate::crypto::{decrypt, encrypt};
use crate::error::Result;
use crate::key_ops::MasterKey;
use crate::util::parent_dir;

/// What to do when the destination already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Atomically replace the existing file
    Replace,
    /// Fail with `AlreadyExists` instead of replacing
    CreateNew,
}

/// Write `contents` to `path` via temp file + rename
///
/// `permissions`, when given, are applied to the temporary file before it
/// becomes visible under `path`.
pub fn write_atomic(
    path: &Path,
    contents: &[u8],
    mode: WriteMode,
    permissions: Option<fs::Permissions>,
) -> io::Result<()> {
    let dir = parent_dir(path);
    fs::create_dir_all(dir)?;

    let mut tmp = tempfile::Builder::new()
        .prefix(TEMP_FILE_PREFIX)
        .tempfile_in(dir)?;
    tmp.write_all(contents)?;
    if let Some(perms) = permissions {
        fs::set_permissions(tmp.path(), perms)?;
    }
    tmp.as_file().sync_all()?;

    match mode {
        WriteMode::Replace => tmp.persist(path),
        WriteMode::CreateNew => tmp.persist_noclobber(path),
    }
    .map(drop)
    .map_err(|e| e.error)
}

/// Encrypt a file on disk
///
/// Reads the plaintext file, encrypts it in-memory, writes the blob.
/// Returns the plaintext size in bytes.
pub fn encrypt_file<P: AsRef<Path>, Q: AsRef<Path>>(
    key: &MasterKey,
    input_path: P,
    output_path: Q,
) -> Result<u64> {
    let plaintext = Zeroizing::new(fs::read(input_path.as_ref())?);
    let blob = encrypt(key, &plaintext)?;
    write_atomic(output_path.as_ref(), &blob, WriteMode::Replace, None)?;
    Ok(plaintext.len() as u64)
}

/// Decrypt a blob file on disk
///
/// Nothing is written unless the whole blob authenticates.
/// Returns the plaintext size in bytes.
pub fn decrypt_file<P: AsRef<Path>, Q: AsRef<Path>>(
    key: &MasterKey,
    input_path: P,
    output_path: Q,
) -> Result<u64> {
    let blob = fs::read(input_path.as_ref())?;
    let plaintext = decrypt(key, &blob)?;
    write_atomic(output_path.as_ref(), &plaintext, WriteMode::Replace, None)?;
    Ok(plaintext.len() as u64)
}
