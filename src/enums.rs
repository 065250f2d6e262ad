// src/enums.rs
//! Public enum types used throughout the crate
//!
//! Central location for the closed variant sets that describe where a
//! master key lives and how it was obtained.

use serde::{Deserialize, Serialize};

/// Persistent home of the master key, in resolution priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyBackend {
    CredentialStore,
    File,
}

impl KeyBackend {
    /// Backends in the order the resolver consults them
    pub const PRIORITY: [KeyBackend; 2] = [KeyBackend::CredentialStore, KeyBackend::File];
}

/// On-disk encoding of the key file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum KeyFileFormat {
    /// Base64 text decoding to 32 bytes
    #[default]
    Base64,
    /// Legacy: the 32 key bytes written verbatim
    Raw,
}

/// Where the active key came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeySource {
    CredentialStore,
    File(KeyFileFormat),
    Generated,
    Rotated,
}

/// Step of a per-target re-encryption that failed during rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationStage {
    Read,
    Decrypt,
    Encrypt,
    Write,
}
