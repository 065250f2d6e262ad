// src/crypto/mod.rs
//! Pure cryptographic operations, no I/O
//!
//! AES-256-GCM over in-memory buffers. Blob layout is
//! `nonce(12) ‖ ciphertext ‖ tag(16)` with no header and no associated data.
mod decrypt;
mod encrypt;

use aes_gcm::{Aes256Gcm, Key, KeyInit};

use crate::key_ops::MasterKey;

pub use decrypt::decrypt;
pub use encrypt::encrypt;

pub(crate) fn cipher(key: &MasterKey) -> Aes256Gcm {
    Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.expose_secret().as_slice()))
}
