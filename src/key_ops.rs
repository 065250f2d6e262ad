// src/key_ops.rs
//! Master key type, generation and text representations
//!
//! `MasterKey` is the only way key material moves through the crate. It can
//! only be built from exactly 32 bytes, zeroizes on drop and never prints
//! its contents.

use std::fmt;

use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;
use zeroize::Zeroizing;

use crate::aliases::MasterKey32;
use crate::consts::{FINGERPRINT_CONTEXT, FINGERPRINT_LEN, KEY_LEN};
use crate::error::{Result, VaultError};
use crate::util::fill_random;

/// 256-bit master key, zeroized on drop
pub struct MasterKey(MasterKey32);

impl MasterKey {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(MasterKey32::new(bytes))
    }

    /// `None` unless `bytes` is exactly 32 bytes long
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let array: [u8; KEY_LEN] = bytes.try_into().ok()?;
        let array = Zeroizing::new(array);
        Some(Self::from_bytes(*array))
    }

    /// Draw a fresh key from the OS CSPRNG
    pub fn generate() -> Result<Self> {
        let mut bytes = Zeroizing::new([0u8; KEY_LEN]);
        fill_random(bytes.as_mut_slice())
            .map_err(|e| VaultError::KeyResolution(format!("cannot generate key: {e}")))?;
        Ok(Self::from_bytes(*bytes))
    }

    #[inline]
    pub fn expose_secret(&self) -> &[u8; KEY_LEN] {
        self.0.expose_secret()
    }

    /// Stable, non-secret identifier for logs and reports
    pub fn fingerprint(&self) -> String {
        let derived = Zeroizing::new(blake3::derive_key(
            FINGERPRINT_CONTEXT,
            self.expose_secret(),
        ));
        hex::encode(&derived[..FINGERPRINT_LEN])
    }

    /// Current on-disk / credential-store text form
    pub fn to_base64(&self) -> Zeroizing<String> {
        Zeroizing::new(STANDARD.encode(self.expose_secret()))
    }

    /// Parse base64 text in either alphabet; `None` unless it decodes to 32 bytes
    pub fn from_base64(text: &str) -> Option<Self> {
        let text = text.trim();
        [&STANDARD, &URL_SAFE].into_iter().find_map(|engine| {
            let decoded = Zeroizing::new(engine.decode(text).ok()?);
            Self::from_slice(&decoded)
        })
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MasterKey")
            .field("fingerprint", &self.fingerprint())
            .finish_non_exhaustive()
    }
}

/// Generate a new random 256-bit master key
#[inline]
pub fn generate_key() -> Result<MasterKey> {
    MasterKey::generate()
}
