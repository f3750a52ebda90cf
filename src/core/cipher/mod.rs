//! Envelope encryption.
//!
//! One master key for the process, one data-encryption key per project,
//! derived on demand with HKDF-SHA256 and never persisted. Values are
//! sealed with AES-256-GCM; the authentication tag is what makes a
//! cross-project decryption or a tampered ciphertext fail closed.
//!
//! Compromising a single derived key exposes one project; the master key
//! and every other project's data stay out of reach.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use hkdf::Hkdf;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::core::constants::{
    AES_GCM_IV_LENGTH, AES_GCM_TAG_LENGTH, AES_KEY_LENGTH, MASTER_KEY_HEX_LENGTH,
    PROJECT_KEY_INFO,
};
use crate::error::{CipherError, Result};

/// The process-wide master key. Supplied once at initialization, never
/// persisted, zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct MasterKey([u8; AES_KEY_LENGTH]);

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("MasterKey").field(&"[redacted]").finish()
    }
}

impl MasterKey {
    /// Parse a master key from its 64-character hex representation.
    ///
    /// # Errors
    ///
    /// Returns `CipherError` if the string is not exactly 64 hex characters.
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        if hex_str.len() != MASTER_KEY_HEX_LENGTH {
            return Err(CipherError::InvalidMasterKey {
                expected: MASTER_KEY_HEX_LENGTH,
                got: hex_str.len(),
            }
            .into());
        }

        let bytes =
            hex::decode(hex_str).map_err(|e| CipherError::MasterKeyNotHex(e.to_string()))?;
        let mut key = [0u8; AES_KEY_LENGTH];
        key.copy_from_slice(&bytes);
        Ok(Self(key))
    }

    /// Wrap raw key material.
    pub fn from_bytes(bytes: [u8; AES_KEY_LENGTH]) -> Self {
        Self(bytes)
    }
}

/// A per-project data-encryption key. Derived transiently for one
/// operation, zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ProjectKey([u8; AES_KEY_LENGTH]);

impl ProjectKey {
    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// An encrypted secret value in its at-rest representation.
///
/// Ciphertext is base64, IV and tag are hex; all three travel together.
/// The algorithm (AES-256-GCM, 12-byte IV, 16-byte tag) never varies and
/// is not stored per value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedValue {
    pub ciphertext: String,
    pub iv: String,
    pub auth_tag: String,
}

/// Performs project-scoped authenticated encryption.
pub struct CipherEngine {
    master_key: MasterKey,
}

impl CipherEngine {
    /// Create an engine from an already-validated master key.
    pub fn new(master_key: MasterKey) -> Self {
        Self { master_key }
    }

    /// Create an engine from a 64-character hex master key string.
    ///
    /// Validation happens here, eagerly: a misconfigured key fails
    /// construction, not the first encrypt call.
    ///
    /// # Errors
    ///
    /// Returns `CipherError` if the key is missing, the wrong length, or
    /// not valid hex.
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        Ok(Self::new(MasterKey::from_hex(hex_str)?))
    }

    /// Derive the data-encryption key for a project.
    ///
    /// Deterministic: the same project ID always yields the same key.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::KeyDerivation` if HKDF expansion fails.
    pub fn derive_project_key(&self, project_id: &str) -> Result<ProjectKey> {
        let hk = Hkdf::<Sha256>::new(Some(project_id.as_bytes()), &self.master_key.0);
        let mut okm = [0u8; AES_KEY_LENGTH];
        hk.expand(PROJECT_KEY_INFO, &mut okm)
            .map_err(|e| CipherError::KeyDerivation(e.to_string()))?;
        Ok(ProjectKey(okm))
    }

    /// Encrypt a plaintext value under a project's derived key.
    ///
    /// A fresh random 12-byte IV is generated per call; identical
    /// plaintexts never share an IV.
    ///
    /// # Errors
    ///
    /// Returns `CipherError` if key derivation, random generation, or
    /// encryption fails.
    pub fn encrypt(&self, plaintext: &str, project_id: &str) -> Result<EncryptedValue> {
        let key = self.derive_project_key(project_id)?;
        let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
            .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?;

        let iv = generate_iv()?;
        let nonce = Nonce::from_slice(&iv);

        let mut sealed = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?;

        // GCM appends the 16-byte tag to the ciphertext; store it separately.
        let tag = sealed.split_off(sealed.len() - AES_GCM_TAG_LENGTH);

        Ok(EncryptedValue {
            ciphertext: BASE64.encode(&sealed),
            iv: hex::encode(iv),
            auth_tag: hex::encode(tag),
        })
    }

    /// Decrypt an encrypted value under a project's derived key.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::IntegrityCheckFailed` if the authentication
    /// tag does not verify: the value was encrypted for a different
    /// project, or the stored bytes were tampered with. Never returns
    /// plaintext in either case.
    pub fn decrypt(&self, value: &EncryptedValue, project_id: &str) -> Result<Zeroizing<String>> {
        let key = self.derive_project_key(project_id)?;

        let iv = decode_hex_field(&value.iv, "iv", AES_GCM_IV_LENGTH)?;
        let tag = decode_hex_field(&value.auth_tag, "auth_tag", AES_GCM_TAG_LENGTH)?;
        let mut sealed = BASE64
            .decode(&value.ciphertext)
            .map_err(|e| CipherError::InvalidPayload(format!("ciphertext is not base64: {}", e)))?;
        sealed.extend_from_slice(&tag);

        let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
            .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?;
        let nonce = Nonce::from_slice(&iv);

        let plaintext = cipher
            .decrypt(nonce, sealed.as_ref())
            .map_err(|_| CipherError::IntegrityCheckFailed)?;

        let text = String::from_utf8(plaintext)
            .map_err(|e| CipherError::InvalidPayload(format!("plaintext is not UTF-8: {}", e)))?;
        Ok(Zeroizing::new(text))
    }
}

/// Generate a random 12-byte IV for AES-GCM.
fn generate_iv() -> Result<[u8; AES_GCM_IV_LENGTH]> {
    let mut iv = [0u8; AES_GCM_IV_LENGTH];
    getrandom::getrandom(&mut iv).map_err(|e| CipherError::RngFailed(e.to_string()))?;
    Ok(iv)
}

fn decode_hex_field(value: &str, field: &'static str, expected: usize) -> Result<Vec<u8>> {
    let bytes = hex::decode(value)
        .map_err(|e| CipherError::InvalidPayload(format!("{} is not hex: {}", field, e)))?;
    if bytes.len() != expected {
        return Err(CipherError::InvalidPayload(format!(
            "{} must be {} bytes, got {}",
            field,
            expected,
            bytes.len()
        ))
        .into());
    }
    Ok(bytes)
}
