// src/backend/mod.rs
//! Persistent homes of the master key
//!
//! Each backend call returns a typed result; whether a failure is fatal or
//! a logged warning is decided by the caller (resolver, rotation, shredder).
pub mod credential;
pub mod key_file;

pub use credential::{CredentialError, CredentialStore, KeyringStore, MemoryCredentialStore};
pub use key_file::{
    parse_key_file, read_key_file, restrict_permissions, upgrade_legacy_key_file, write_key_file,
    KeyFileState,
};
