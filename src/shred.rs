// src/shred.rs
//! Crypto-shredding: irrecoverable destruction of the master key
//!
//! The key file is the primary guarantee: it is overwritten with random
//! bytes, then zeros, then unlinked. The credential-store entry is erased
//! on a best-effort basis. Media-level copies (journals, snapshots,
//! wear-levelled blocks) are out of reach.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::backend::{restrict_permissions, CredentialError, CredentialStore};
use crate::consts::KEY_LEN;
use crate::error::{Result, VaultError};
use crate::util::fill_random;

/// What happened to the credential-store entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CredentialShred {
    Disabled,
    /// Overwritten with garbage, then deleted
    Erased,
    /// There was no entry to erase
    Missing,
    Failed(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct ShredReport {
    pub shredded_at: DateTime<Utc>,
    pub key_path: PathBuf,
    /// Bytes overwritten in the key file; `None` when no file existed
    pub overwritten_bytes: Option<u64>,
    pub file_removed: bool,
    pub credential_store: CredentialShred,
    pub warnings: Vec<String>,
}

impl ShredReport {
    /// No backend is known to still hold the key
    pub fn is_complete(&self) -> bool {
        let file_gone = self.overwritten_bytes.is_none() || self.file_removed;
        let credential_gone = !matches!(self.credential_store, CredentialShred::Failed(_));
        file_gone && credential_gone
    }
}

/// Destroy the key at `key_path` and, if given, in the credential store
///
/// Fails only when the key file could not be fully overwritten; the caller
/// must then assume the key still exists. Do not re-run on a file that was
/// already overwritten: it holds only zeros.
pub fn shred(key_path: &Path, credentials: Option<&dyn CredentialStore>) -> Result<ShredReport> {
    warn!(path = %key_path.display(), "crypto-shredding master key");

    let mut warnings = Vec::new();

    let overwritten_bytes =
        overwrite_key_file(key_path).map_err(|source| VaultError::ShredIncomplete {
            path: key_path.to_path_buf(),
            source,
        })?;

    let file_removed = match overwritten_bytes {
        None => {
            debug!(path = %key_path.display(), "no key file to shred");
            false
        }
        Some(_) => match fs::remove_file(key_path) {
            Ok(()) => true,
            Err(err) => {
                warn!(path = %key_path.display(), error = %err, "key file overwritten but not removed");
                warnings.push(format!("key file overwritten but not removed: {err}"));
                false
            }
        },
    };

    let credential_store = match credentials {
        None => CredentialShred::Disabled,
        Some(store) => shred_credential(store, &mut warnings),
    };

    let report = ShredReport {
        shredded_at: Utc::now(),
        key_path: key_path.to_path_buf(),
        overwritten_bytes,
        file_removed,
        credential_store,
        warnings,
    };
    info!(
        path = %key_path.display(),
        complete = report.is_complete(),
        "master key destroyed"
    );
    Ok(report)
}

/// Random pass then zero pass over the full length; `None` if absent
///
/// The zero pass runs even when the random pass failed.
fn overwrite_key_file(path: &Path) -> io::Result<Option<u64>> {
    if !path.exists() {
        return Ok(None);
    }
    // A read-only key file still belongs to us
    if path.is_file() {
        if let Err(err) = restrict_permissions(path) {
            debug!(error = %err, "could not make key file writable before shredding");
        }
    }

    let mut file = match OpenOptions::new().write(true).open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err),
    };
    let len = file.metadata()?.len();
    let size = usize::try_from(len).map_err(io::Error::other)?;

    let random_pass = random_bytes(size).and_then(|noise| overwrite_pass(&mut file, &noise));
    let zero_pass = overwrite_pass(&mut file, &vec![0u8; size]);
    random_pass.and(zero_pass)?;

    Ok(Some(len))
}

fn random_bytes(len: usize) -> io::Result<Zeroizing<Vec<u8>>> {
    let mut noise = Zeroizing::new(vec![0u8; len]);
    fill_random(&mut noise)?;
    Ok(noise)
}

fn overwrite_pass(file: &mut File, bytes: &[u8]) -> io::Result<()> {
    file.seek(SeekFrom::Start(0))?;
    file.write_all(bytes)?;
    file.sync_all()
}

fn shred_credential(store: &dyn CredentialStore, warnings: &mut Vec<String>) -> CredentialShred {
    match store.get() {
        Ok(None) => {
            warn!("no credential-store entry to shred");
            warnings.push("no credential-store entry to shred".to_owned());
            return CredentialShred::Missing;
        }
        Ok(Some(_)) => {}
        Err(err) => debug!(error = %err, "credential store probe failed; erasing anyway"),
    }

    let garbage = match random_bytes(KEY_LEN) {
        Ok(noise) => Zeroizing::new(hex::encode(&*noise)),
        Err(err) => {
            warn!(error = %err, "no randomness for credential overwrite");
            Zeroizing::new(String::new())
        }
    };
    if let Err(err) = store.set(&garbage) {
        warn!(error = %err, "credential-store overwrite failed");
        warnings.push(format!("credential-store overwrite failed: {err}"));
    }

    match store.delete() {
        Ok(()) => CredentialShred::Erased,
        Err(CredentialError::NotFound) => {
            warnings.push("credential-store entry vanished before deletion".to_owned());
            CredentialShred::Missing
        }
        Err(err) => {
            warn!(error = %err, "credential-store entry could not be deleted");
            warnings.push(format!("credential-store delete failed: {err}"));
            CredentialShred::Failed(err.to_string())
        }
    }
}
