//! Access token encryption.
//!
//! Tokens are sealed with AES-256-GCM under a process-wide key. The stored
//! form is `base64(nonce || ciphertext)`, a fresh random nonce per call.

use aes_gcm::aead::{Aead, KeyInit};
use argon2::{Algorithm, Argon2, Params, Version};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;

use crate::{Error, Result};

/// Length of the AES-256 key in bytes.
pub const KEY_LEN: usize = 32;

/// Shortest salt accepted for passphrase derivation.
pub const MIN_SALT_LEN: usize = 8;

const NONCE_LEN: usize = 12;

// Argon2id parameters: m=19456 KiB, t=2, p=1
const ARGON2_M_COST: u32 = 19456;
const ARGON2_T_COST: u32 = 2;
const ARGON2_P_COST: u32 = 1;

/// Reversible, keyed encryption for stored access tokens.
#[derive(Clone)]
pub struct TokenCipher {
    cipher: Aes256Gcm,
}

impl TokenCipher {
    pub fn new(key: &[u8; KEY_LEN]) -> Self {
        Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key)),
        }
    }

    /// Build a cipher from a base64-encoded 32-byte key.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| Error::InvalidInput(format!("token key is not valid base64: {}", e)))?;
        let key: [u8; KEY_LEN] = bytes.try_into().map_err(|bytes: Vec<u8>| {
            Error::InvalidInput(format!(
                "token key must be {} bytes, got {}",
                KEY_LEN,
                bytes.len()
            ))
        })?;
        Ok(Self::new(&key))
    }

    /// Derive the key from a passphrase and salt with Argon2id.
    pub fn from_passphrase(passphrase: &str, salt: &str) -> Result<Self> {
        if salt.len() < MIN_SALT_LEN {
            return Err(Error::InvalidInput(format!(
                "passphrase salt must be at least {} bytes",
                MIN_SALT_LEN
            )));
        }

        let params = Params::new(ARGON2_M_COST, ARGON2_T_COST, ARGON2_P_COST, Some(KEY_LEN))
            .map_err(|e| Error::Internal(format!("invalid argon2 parameters: {}", e)))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut key = [0u8; KEY_LEN];
        argon2
            .hash_password_into(passphrase.as_bytes(), salt.as_bytes(), &mut key)
            .map_err(|e| Error::InvalidInput(format!("key derivation failed: {}", e)))?;
        Ok(Self::new(&key))
    }

    /// Generate a random key, base64-encoded.
    pub fn generate_key() -> String {
        let mut key = [0u8; KEY_LEN];
        rand::thread_rng().fill_bytes(&mut key);
        STANDARD.encode(key)
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|_| Error::Internal("token encryption failed".to_string()))?;

        let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(blob))
    }

    /// Decrypt a stored blob. Any tampering, truncation or wrong key is a
    /// `CorruptCredential` error.
    pub fn decrypt(&self, blob: &str) -> Result<String> {
        let bytes = STANDARD
            .decode(blob.trim())
            .map_err(|e| Error::CorruptCredential(format!("not valid base64: {}", e)))?;
        if bytes.len() <= NONCE_LEN {
            return Err(Error::CorruptCredential("blob too short".to_string()));
        }

        let (nonce, ciphertext) = bytes.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| {
                Error::CorruptCredential("authentication failed (wrong key or corrupt data)".to_string())
            })?;

        String::from_utf8(plaintext)
            .map_err(|_| Error::CorruptCredential("decrypted token is not utf-8".to_string()))
    }
}

impl std::fmt::Debug for TokenCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCipher").finish_non_exhaustive()
    }
}
