//! Secret types.
//!
//! A `Secret` is the live row for one key in one environment; a
//! `SecretVersion` is an immutable snapshot of the value a secret held
//! before an update replaced it.

use chrono::{DateTime, Utc};
use zeroize::Zeroizing;

use crate::core::cipher::EncryptedValue;
use crate::core::types::{EnvironmentId, SecretKey, UserId};

/// A stored secret.
///
/// `value` is populated with the decrypted plaintext only when the caller
/// asked for values; listing without values leaves it `None`.
#[derive(Debug, Clone)]
pub struct Secret {
    pub id: String,
    pub environment_id: EnvironmentId,
    pub key: SecretKey,
    pub value: Option<Zeroizing<String>>,
    pub description: Option<String>,
    pub is_sensitive: bool,
    /// Starts at 1 and increments by exactly one per value change.
    pub version: i64,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An immutable pre-update snapshot of a secret's value.
///
/// Appended exactly once per value-changing update and never mutated;
/// `version` is the version the secret held when this ciphertext was live.
#[derive(Debug, Clone)]
pub struct SecretVersion {
    pub id: String,
    pub secret_id: String,
    pub encrypted: EncryptedValue,
    pub version: i64,
    pub changed_by: UserId,
    pub changed_at: DateTime<Utc>,
}
