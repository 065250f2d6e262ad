// src/backend/credential.rs
//! Credential-store backend: one secret string under a fixed service/account

use std::fmt;

use parking_lot::Mutex;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::consts::{CREDENTIAL_ACCOUNT, CREDENTIAL_SERVICE};

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("no credential entry")]
    NotFound,

    #[error("credential store unavailable: {0}")]
    Backend(String),
}

/// A secret store addressed by a single fixed entry
///
/// Implementations must be safe to call from several threads.
pub trait CredentialStore: Send + Sync {
    /// `Ok(None)` when the entry does not exist
    fn get(&self) -> Result<Option<Zeroizing<String>>, CredentialError>;

    fn set(&self, secret: &str) -> Result<(), CredentialError>;

    /// `Err(NotFound)` when there was nothing to delete
    fn delete(&self) -> Result<(), CredentialError>;
}

/// OS credential store (macOS Keychain, Windows Credential Manager, Secret Service)
#[derive(Debug, Clone)]
pub struct KeyringStore {
    service: String,
    account: String,
}

impl KeyringStore {
    pub fn new(service: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            account: account.into(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry, CredentialError> {
        keyring::Entry::new(&self.service, &self.account)
            .map_err(|e| CredentialError::Backend(e.to_string()))
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new(CREDENTIAL_SERVICE, CREDENTIAL_ACCOUNT)
    }
}

impl CredentialStore for KeyringStore {
    fn get(&self) -> Result<Option<Zeroizing<String>>, CredentialError> {
        match self.entry()?.get_password() {
            Ok(value) => Ok(Some(Zeroizing::new(value))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(CredentialError::Backend(err.to_string())),
        }
    }

    fn set(&self, secret: &str) -> Result<(), CredentialError> {
        self.entry()?
            .set_password(secret)
            .map_err(|e| CredentialError::Backend(e.to_string()))
    }

    fn delete(&self) -> Result<(), CredentialError> {
        match self.entry()?.delete_password() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Err(CredentialError::NotFound),
            Err(err) => Err(CredentialError::Backend(err.to_string())),
        }
    }
}

/// In-process credential store for tests and embedders without an OS keyring
#[derive(Default)]
pub struct MemoryCredentialStore {
    value: Mutex<Option<Zeroizing<String>>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated store, e.g. to simulate an entry left by another install
    pub fn with_secret(secret: &str) -> Self {
        Self {
            value: Mutex::new(Some(Zeroizing::new(secret.to_owned()))),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value.lock().is_none()
    }
}

impl fmt::Debug for MemoryCredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCredentialStore")
            .field("populated", &!self.is_empty())
            .finish()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Result<Option<Zeroizing<String>>, CredentialError> {
        Ok(self.value.lock().clone())
    }

    fn set(&self, secret: &str) -> Result<(), CredentialError> {
        *self.value.lock() = Some(Zeroizing::new(secret.to_owned()));
        Ok(())
    }

    fn delete(&self) -> Result<(), CredentialError> {
        self.value
            .lock()
            .take()
            .map(drop)
            .ok_or(CredentialError::NotFound)
    }
}
