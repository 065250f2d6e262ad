// src/vault.rs
//! The vault: one explicitly configured owner of the active master key
//!
//! `encrypt`/`decrypt` share a read lock on the key; `rotate` holds the write
//! lock for the whole swap, so every call sees either the old key or the new
//! one, never a mix. `shred` consumes the vault; there is no way back.

use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;
use zeroize::Zeroizing;

use crate::backend::{CredentialStore, KeyringStore};
use crate::config::VaultConfig;
use crate::crypto;
use crate::enums::KeySource;
use crate::error::Result;
use crate::file_ops;
use crate::key_ops::MasterKey;
use crate::resolver::{KeyResolver, ResolvedKey};
use crate::rotation::{self, RotationReport};
use crate::shred::{self, ShredReport};

struct ActiveKey {
    key: MasterKey,
    source: KeySource,
}

pub struct Vault {
    config: VaultConfig,
    credentials: Option<Arc<dyn CredentialStore>>,
    active: RwLock<ActiveKey>,
}

impl Vault {
    /// Resolve the master key as configured, using the OS credential store
    /// when `use_credential_store` is set
    pub fn open(config: VaultConfig) -> Result<Self> {
        let credentials = config
            .use_credential_store
            .then(|| Arc::new(KeyringStore::default()) as Arc<dyn CredentialStore>);
        Self::open_with(config, credentials)
    }

    /// Like `open`, with an explicit credential backend (`None` disables it)
    ///
    /// `config.use_credential_store` is not consulted.
    pub fn open_with(
        config: VaultConfig,
        credentials: Option<Arc<dyn CredentialStore>>,
    ) -> Result<Self> {
        let ResolvedKey { key, source } = KeyResolver::new(&config.key_path)
            .with_credentials(credentials.clone())
            .with_legacy_upgrade(config.upgrade_legacy_key_file)
            .resolve()?;

        info!(
            path = %config.key_path.display(),
            source = ?source,
            fingerprint = %key.fingerprint(),
            "vault opened"
        );

        Ok(Self {
            config,
            credentials,
            active: RwLock::new(ActiveKey { key, source }),
        })
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    pub fn key_path(&self) -> &Path {
        &self.config.key_path
    }

    pub fn key_source(&self) -> KeySource {
        self.active.read().source
    }

    pub fn fingerprint(&self) -> String {
        self.active.read().key.fingerprint()
    }

    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        crypto::encrypt(&self.active.read().key, plaintext)
    }

    pub fn decrypt(&self, blob: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        crypto::decrypt(&self.active.read().key, blob)
    }

    pub fn encrypt_file<P: AsRef<Path>, Q: AsRef<Path>>(&self, input: P, output: Q) -> Result<u64> {
        file_ops::encrypt_file(&self.active.read().key, input, output)
    }

    pub fn decrypt_file<P: AsRef<Path>, Q: AsRef<Path>>(&self, input: P, output: Q) -> Result<u64> {
        file_ops::decrypt_file(&self.active.read().key, input, output)
    }

    /// Rotate to a fresh key, migrating exactly the listed ciphertext files
    ///
    /// Ciphertext not listed in `targets` stays under the old key, which is
    /// discarded when this returns: re-process it beforehand or lose it.
    pub fn rotate<P: AsRef<Path>>(&self, targets: &[P]) -> Result<RotationReport> {
        let mut active = self.active.write();
        let (new_key, report) = rotation::rotate_key(
            &active.key,
            &self.config.key_path,
            self.credentials.as_deref(),
            targets,
        )?;
        let previous = std::mem::replace(
            &mut *active,
            ActiveKey {
                key: new_key,
                source: KeySource::Rotated,
            },
        );
        drop(previous);
        Ok(report)
    }

    /// Destroy the master key in every backend and in memory
    pub fn shred(self) -> Result<ShredReport> {
        let Self {
            config,
            credentials,
            active,
        } = self;
        drop(active);
        shred::shred(&config.key_path, credentials.as_deref())
    }
}

impl std::fmt::Debug for Vault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault")
            .field("key_path", &self.config.key_path)
            .field("key_source", &self.key_source())
            .field("credential_store", &self.credentials.is_some())
            .finish_non_exhaustive()
    }
}
