// src/rotation/mod.rs
//! Master key rotation with selective re-encryption
//!
//! A fresh key is generated and committed to the key file before any
//! ciphertext is touched. Only the caller's explicit target list is migrated;
//! nothing is discovered by scanning.

mod report;

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::backend::{write_key_file, CredentialError, CredentialStore};
use crate::crypto::{decrypt, encrypt};
use crate::enums::RotationStage;
use crate::error::{Result, VaultError};
use crate::file_ops::{write_atomic, WriteMode};
use crate::key_ops::MasterKey;

pub use report::{CredentialSync, RotationReport, TargetFailure};

/// Replace `current` with a new key and migrate `targets` to it
///
/// Fails only if the new key cannot be generated or written to the key
/// file; in that case nothing has changed. Per-target failures land in the
/// report. The caller owns swapping the returned key into service.
pub fn rotate_key<P: AsRef<Path>>(
    current: &MasterKey,
    key_path: &Path,
    credentials: Option<&dyn CredentialStore>,
    targets: &[P],
) -> Result<(MasterKey, RotationReport)> {
    let new_key = MasterKey::generate()?;

    write_key_file(key_path, &new_key, WriteMode::Replace).map_err(|e| {
        VaultError::KeyResolution(format!(
            "cannot commit rotated key to {}: {e}",
            key_path.display()
        ))
    })?;
    let credential_store = sync_credential_store(credentials, &new_key);

    let mut report = RotationReport {
        rotated_at: Utc::now(),
        old_fingerprint: current.fingerprint(),
        new_fingerprint: new_key.fingerprint(),
        credential_store,
        reencrypted: Vec::new(),
        failed: Vec::new(),
        skipped: Vec::new(),
    };

    let mut seen = HashSet::new();
    for target in targets {
        let path = target.as_ref();
        if !seen.insert(path.to_path_buf()) {
            report.skipped.push(path.to_path_buf());
            continue;
        }
        match reencrypt_file(current, &new_key, path) {
            Ok(()) => report.reencrypted.push(path.to_path_buf()),
            Err(failure) => {
                warn!(
                    path = %path.display(),
                    stage = ?failure.stage,
                    error = %failure.error,
                    "rotation target skipped"
                );
                report.failed.push(failure);
            }
        }
    }

    info!(
        old = %report.old_fingerprint,
        new = %report.new_fingerprint,
        reencrypted = report.reencrypted.len(),
        failed = report.failed.len(),
        "master key rotated"
    );
    Ok((new_key, report))
}

/// Decrypt `path` under `old`, re-encrypt under `new`, replace atomically
///
/// The target keeps its permission bits. On any failure the file on disk is
/// left exactly as it was.
pub fn reencrypt_file(
    old: &MasterKey,
    new: &MasterKey,
    path: &Path,
) -> std::result::Result<(), TargetFailure> {
    let fail = |stage: RotationStage, err: &dyn std::fmt::Display| {
        TargetFailure::new(path, stage, err)
    };

    let blob = fs::read(path).map_err(|e| fail(RotationStage::Read, &e))?;
    let permissions = fs::metadata(path)
        .map(|m| m.permissions())
        .map_err(|e| fail(RotationStage::Read, &e))?;

    let plaintext = decrypt(old, &blob).map_err(|e| fail(RotationStage::Decrypt, &e))?;
    let reencrypted = encrypt(new, &plaintext).map_err(|e| fail(RotationStage::Encrypt, &e))?;

    write_atomic(path, &reencrypted, WriteMode::Replace, Some(permissions))
        .map_err(|e| fail(RotationStage::Write, &e))
}

fn sync_credential_store(
    credentials: Option<&dyn CredentialStore>,
    new_key: &MasterKey,
) -> CredentialSync {
    let Some(store) = credentials else {
        return CredentialSync::Disabled;
    };

    let err = match store.set(&new_key.to_base64()) {
        Ok(()) => return CredentialSync::Updated,
        Err(err) => err,
    };
    warn!(error = %err, "could not save rotated key to credential store; removing stale entry");

    match store.delete() {
        Ok(()) | Err(CredentialError::NotFound) => CredentialSync::Cleared,
        Err(err) => {
            error!(
                error = %err,
                "credential store still holds the previous key and will shadow the key file"
            );
            CredentialSync::Stale
        }
    }
}
