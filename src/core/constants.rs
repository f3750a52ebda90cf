//! Constants used throughout coffer.
//!
//! Centralizes cryptographic parameters and configuration values.

/// AES-256 key size in bytes.
pub const AES_KEY_LENGTH: usize = 32;

/// AES-GCM initialization vector size in bytes.
pub const AES_GCM_IV_LENGTH: usize = 12;

/// AES-GCM authentication tag size in bytes.
pub const AES_GCM_TAG_LENGTH: usize = 16;

/// Master key length as a hex string (32 bytes).
pub const MASTER_KEY_HEX_LENGTH: usize = 64;

/// HKDF context label for project key derivation.
///
/// Fixed for the lifetime of stored data: changing it would orphan every
/// ciphertext encrypted under the previous label.
pub const PROJECT_KEY_INFO: &[u8] = b"coffer-dek";

/// Environment variable holding the master key hex string.
pub const MASTER_KEY_ENV: &str = "COFFER_MASTER_KEY";
