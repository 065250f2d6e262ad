// src/crypto/encrypt.rs
use aes_gcm::aead::Aead;
use aes_gcm::Nonce;

use crate::consts::NONCE_LEN;
use crate::error::{Result, VaultError};
use crate::key_ops::MasterKey;
use crate::util::fill_random;

use super::cipher;

/// Encrypt plaintext → `nonce ‖ ciphertext ‖ tag` (in-memory)
///
/// Every call draws a fresh random nonce; nothing is counter-derived, so two
/// encryptions of the same plaintext never share a blob.
pub fn encrypt(key: &MasterKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    let mut nonce = [0u8; NONCE_LEN];
    fill_random(&mut nonce)?;

    let sealed = cipher(key)
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|_| VaultError::Encryption)?;

    let mut blob = Vec::with_capacity(NONCE_LEN + sealed.len());
    blob.extend_from_slice(&nonce);
    blob.extend_from_slice(&sealed);
    Ok(blob)
}
