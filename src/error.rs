// src/error.rs
//! Public error type for the entire crate

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("Key resolution failed: {0}")]
    KeyResolution(String),

    #[error("Malformed ciphertext: {len} bytes is shorter than the 28-byte minimum")]
    Format { len: usize },

    #[error("Integrity check failed: ciphertext was tampered with or encrypted under another key")]
    Integrity,

    #[error("Cannot restrict permissions on {}: {source}", path.display())]
    Permission {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Key file {} was not fully overwritten: {source}", path.display())]
    ShredIncomplete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Encryption failed")]
    Encryption,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for VaultError {
    fn from(err: toml::de::Error) -> Self {
        VaultError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, VaultError>;
