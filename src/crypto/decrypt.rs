// src/crypto/decrypt.rs
use aes_gcm::aead::Aead;
use aes_gcm::Nonce;
use zeroize::Zeroizing;

use crate::consts::{BLOB_OVERHEAD, NONCE_LEN};
use crate::error::{Result, VaultError};
use crate::key_ops::MasterKey;

use super::cipher;

/// Decrypt `nonce ‖ ciphertext ‖ tag` → plaintext (in-memory)
///
/// Blobs shorter than the nonce plus tag are rejected as `Format` before the
/// cipher is touched. Any authentication failure is `Integrity`; no partial
/// plaintext is ever returned.
pub fn decrypt(key: &MasterKey, blob: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    if blob.len() < BLOB_OVERHEAD {
        return Err(VaultError::Format { len: blob.len() });
    }

    let (nonce, sealed) = blob.split_at(NONCE_LEN);
    cipher(key)
        .decrypt(Nonce::from_slice(nonce), sealed)
        .map(Zeroizing::new)
        .map_err(|_| VaultError::Integrity)
}
