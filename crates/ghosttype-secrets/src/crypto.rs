//! AES-256-GCM sealing of the credential blob.
//!
//! A blob is `nonce || ciphertext || tag` with no header. Every seal draws a
//! fresh random nonce, so sealing the same plaintext twice never produces
//! the same bytes.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Result, SecretError};

pub const NONCE_SIZE: usize = 12;
pub const TAG_SIZE: usize = 16;
pub const KEY_SIZE: usize = 32;

/// Shortest byte string that can be a sealed blob (empty plaintext).
pub const MIN_BLOB_LEN: usize = NONCE_SIZE + TAG_SIZE;

/// A 256-bit symmetric key, wiped from memory on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey([u8; KEY_SIZE]);

impl EncryptionKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// A random key. Only useful for stores that never need to be reopened
    /// by another process.
    pub fn random() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// Short non-reversible identifier, safe to log.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0);
        hex::encode(&digest[..4])
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncryptionKey({})", self.fingerprint())
    }
}

impl PartialEq for EncryptionKey {
    fn eq(&self, other: &Self) -> bool {
        let mut diff = 0u8;
        for (x, y) in self.0.iter().zip(other.0.iter()) {
            diff |= x ^ y;
        }
        diff == 0
    }
}

impl Eq for EncryptionKey {}

/// Encrypt `plaintext` into a combined blob.
pub fn seal(key: &EncryptionKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| SecretError::EncryptionFailed(e.to_string()))?;

    let nonce = Nonce::from_slice(&nonce_bytes);
    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| SecretError::EncryptionFailed(e.to_string()))?;

    let mut blob = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&ciphertext);
    Ok(blob)
}

/// Authenticate and decrypt a blob produced by [`seal`].
pub fn open(key: &EncryptionKey, blob: &[u8]) -> Result<Vec<u8>> {
    if blob.len() < MIN_BLOB_LEN {
        return Err(SecretError::DecryptionFailed(format!(
            "blob is {} bytes, expected at least {MIN_BLOB_LEN}",
            blob.len()
        )));
    }

    let (nonce_bytes, ciphertext) = blob.split_at(NONCE_SIZE);

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| SecretError::DecryptionFailed(e.to_string()))?;

    cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| SecretError::DecryptionFailed("authentication failed".to_string()))
}
