// src/lib.rs
//! vaulted-core: master-key vault for payload and file encryption
//!
//! Features:
//! - Master key resolved from the OS credential store or a key file, generated when absent
//! - AES-256-GCM blobs: `nonce(12) ‖ ciphertext ‖ tag(16)`
//! - Online key rotation with explicit re-encryption targets
//! - Crypto-shredding of every key backend
//! - Full secure-gate integration for in-memory key material

pub mod aliases;
pub mod backend;
pub mod config;
pub mod consts;
pub mod crypto;
pub mod enums;
pub mod error;
pub mod file_ops;
pub mod key_ops;
pub mod resolver;
pub mod rotation;
pub mod shred;
pub mod util;
pub mod vault;

// Re-export everything users need at the crate root
pub use backend::{CredentialError, CredentialStore, KeyringStore, MemoryCredentialStore};
pub use config::VaultConfig;
pub use crypto::{decrypt, encrypt};
pub use enums::{KeyBackend, KeyFileFormat, KeySource, RotationStage};
pub use error::{Result, VaultError};
pub use file_ops::{decrypt_file, encrypt_file};
pub use key_ops::{generate_key, MasterKey};
pub use resolver::{resolve, KeyResolver, ResolvedKey};
pub use rotation::{CredentialSync, RotationReport, TargetFailure};
pub use shred::{shred, CredentialShred, ShredReport};
pub use vault::Vault;
