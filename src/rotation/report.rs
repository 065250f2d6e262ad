// src/rotation/report.rs
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::enums::RotationStage;

/// What happened to the credential-store copy of the key during rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CredentialSync {
    /// No credential store configured
    Disabled,
    /// Holds the new key
    Updated,
    /// Could not take the new key, so the old entry was deleted
    Cleared,
    /// Still holds the old key and will shadow the key file on next resolve
    Stale,
}

/// A target that could not be migrated to the new key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetFailure {
    pub path: PathBuf,
    pub stage: RotationStage,
    pub error: String,
}

impl TargetFailure {
    pub(crate) fn new(path: &Path, stage: RotationStage, error: impl fmt::Display) -> Self {
        Self {
            path: path.to_path_buf(),
            stage,
            error: error.to_string(),
        }
    }
}

/// Outcome of one `rotate` call
///
/// Any ciphertext that was not listed as a target is now unreadable: the old
/// key is gone once the report is returned.
#[derive(Debug, Clone, Serialize)]
pub struct RotationReport {
    pub rotated_at: DateTime<Utc>,
    pub old_fingerprint: String,
    pub new_fingerprint: String,
    pub credential_store: CredentialSync,
    pub reencrypted: Vec<PathBuf>,
    pub failed: Vec<TargetFailure>,
    /// Listed more than once; handled on first occurrence
    pub skipped: Vec<PathBuf>,
}

impl RotationReport {
    /// Every listed target now decrypts under the new key
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// JSON rendering for the audit trail; contains no key material
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
