// src/resolver.rs
//! Master key resolution
//!
//! Backends are consulted in `KeyBackend::PRIORITY` order and the first one
//! holding a valid 32-byte key wins. A backend whose content does not decode
//! to exactly 32 bytes counts as absent. When nothing is found a key is
//! generated and persisted.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::backend::{read_key_file, write_key_file, CredentialStore, KeyFileState, KeyringStore};
use crate::enums::{KeyBackend, KeyFileFormat, KeySource};
use crate::error::{Result, VaultError};
use crate::file_ops::WriteMode;
use crate::key_ops::MasterKey;

/// A key together with the place it was found
#[derive(Debug)]
pub struct ResolvedKey {
    pub key: MasterKey,
    pub source: KeySource,
}

pub struct KeyResolver {
    key_path: PathBuf,
    credentials: Option<Arc<dyn CredentialStore>>,
    upgrade_legacy: bool,
}

impl KeyResolver {
    /// File-only resolver; add a credential store with `with_credential_store`
    pub fn new(key_path: impl Into<PathBuf>) -> Self {
        Self {
            key_path: key_path.into(),
            credentials: None,
            upgrade_legacy: false,
        }
    }

    pub fn with_credential_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.credentials = Some(store);
        self
    }

    pub(crate) fn with_credentials(mut self, store: Option<Arc<dyn CredentialStore>>) -> Self {
        self.credentials = store;
        self
    }

    pub fn with_legacy_upgrade(mut self, enabled: bool) -> Self {
        self.upgrade_legacy = enabled;
        self
    }

    pub fn key_path(&self) -> &Path {
        &self.key_path
    }

    pub fn resolve(&self) -> Result<ResolvedKey> {
        // Only a file we saw as missing may be created without clobbering
        let mut file_mode = WriteMode::CreateNew;

        for backend in KeyBackend::PRIORITY {
            let loaded = match backend {
                KeyBackend::CredentialStore => self.load_from_credential_store(),
                KeyBackend::File => match self.read_file()? {
                    KeyFileState::Valid(key, format) => Some(self.adopt_file_key(key, format)),
                    KeyFileState::Missing => None,
                    KeyFileState::Invalid => {
                        warn!(
                            path = %self.key_path.display(),
                            "key file holds no valid 32-byte key; it will be replaced"
                        );
                        file_mode = WriteMode::Replace;
                        None
                    }
                },
            };

            if let Some(resolved) = loaded {
                debug!(
                    backend = ?backend,
                    fingerprint = %resolved.key.fingerprint(),
                    "master key loaded"
                );
                return Ok(resolved);
            }
        }

        self.generate_and_persist(file_mode)
    }

    fn load_from_credential_store(&self) -> Option<ResolvedKey> {
        let store = self.credentials.as_ref()?;
        let secret = match store.get() {
            Ok(Some(secret)) => secret,
            Ok(None) => {
                debug!("no master key in credential store");
                return None;
            }
            Err(err) => {
                warn!(error = %err, "credential store read failed; falling back to key file");
                return None;
            }
        };

        match MasterKey::from_base64(&secret) {
            Some(key) => Some(ResolvedKey {
                key,
                source: KeySource::CredentialStore,
            }),
            None => {
                warn!("credential store entry is not a base64 32-byte key; ignoring it");
                None
            }
        }
    }

    fn read_file(&self) -> Result<KeyFileState> {
        // An unreadable key file must never be treated as absent: generating
        // over it would destroy the only copy of the key.
        read_key_file(&self.key_path).map_err(|e| {
            VaultError::KeyResolution(format!(
                "cannot read key file {}: {e}",
                self.key_path.display()
            ))
        })
    }

    fn adopt_file_key(&self, key: MasterKey, format: KeyFileFormat) -> ResolvedKey {
        if format == KeyFileFormat::Raw {
            if self.upgrade_legacy {
                match write_key_file(&self.key_path, &key, WriteMode::Replace) {
                    Ok(()) => info!(path = %self.key_path.display(), "legacy key file upgraded to base64"),
                    Err(err) => warn!(error = %err, "legacy key file upgrade failed; keeping raw format"),
                }
            } else {
                debug!(path = %self.key_path.display(), "loaded legacy raw key file");
            }
        }
        ResolvedKey {
            key,
            source: KeySource::File(format),
        }
    }

    fn generate_and_persist(&self, file_mode: WriteMode) -> Result<ResolvedKey> {
        let key = MasterKey::generate()?;

        match write_key_file(&self.key_path, &key, file_mode) {
            Ok(()) => {
                info!(
                    path = %self.key_path.display(),
                    fingerprint = %key.fingerprint(),
                    "generated new master key"
                );
                self.store_in_credentials(&key);
                Ok(ResolvedKey {
                    key,
                    source: KeySource::Generated,
                })
            }
            Err(err)
                if err.kind() == io::ErrorKind::AlreadyExists
                    && file_mode == WriteMode::CreateNew
                    && self.key_path.exists() =>
            {
                // Another resolver persisted first; converge on its key
                drop(key);
                self.adopt_concurrent_winner()
            }
            Err(err) => {
                if self.store_in_credentials(&key) {
                    warn!(
                        path = %self.key_path.display(),
                        error = %err,
                        "key file could not be written; master key is held only by the credential store"
                    );
                    Ok(ResolvedKey {
                        key,
                        source: KeySource::Generated,
                    })
                } else {
                    Err(VaultError::KeyResolution(format!(
                        "cannot persist generated key to {}: {err}",
                        self.key_path.display()
                    )))
                }
            }
        }
    }

    fn adopt_concurrent_winner(&self) -> Result<ResolvedKey> {
        match self.read_file()? {
            KeyFileState::Valid(key, format) => {
                debug!(
                    fingerprint = %key.fingerprint(),
                    "another resolver created the key file first; adopting its key"
                );
                self.store_in_credentials(&key);
                Ok(ResolvedKey {
                    key,
                    source: KeySource::File(format),
                })
            }
            KeyFileState::Missing | KeyFileState::Invalid => Err(VaultError::KeyResolution(format!(
                "key file {} was created concurrently but holds no valid key",
                self.key_path.display()
            ))),
        }
    }

    /// Best-effort write; `true` when the store accepted the key
    fn store_in_credentials(&self, key: &MasterKey) -> bool {
        let Some(store) = self.credentials.as_ref() else {
            return false;
        };
        match store.set(&key.to_base64()) {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "could not save master key to credential store");
                false
            }
        }
    }
}

/// Resolve the master key for `key_path`, optionally via the OS credential store
pub fn resolve(key_path: impl Into<PathBuf>, use_credential_store: bool) -> Result<MasterKey> {
    let resolver = KeyResolver::new(key_path);
    let resolver = if use_credential_store {
        resolver.with_credential_store(Arc::new(KeyringStore::default()))
    } else {
        resolver
    };
    Ok(resolver.resolve()?.key)
}
