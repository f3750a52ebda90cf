//! Versioned secret operations.
//!
//! Create, read, update, and delete encrypted secrets, with an immutable
//! history row appended for every value change. Plaintext only exists in
//! memory between the caller and the cipher engine; rows always hold the
//! sealed form.

use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use tracing::debug;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::core::cipher::CipherEngine;
use crate::core::domain::{Secret, SecretVersion};
use crate::core::store::{Database, RawHistoryRow, RawSecretRow, SecretRecord};
use crate::core::validation;
use crate::error::{Result, SecretError};

/// Fields for creating a secret.
#[derive(Debug)]
pub struct NewSecret<'a> {
    pub environment_id: &'a str,
    pub project_id: &'a str,
    pub key: &'a str,
    pub value: &'a str,
    pub description: Option<&'a str>,
    pub is_sensitive: bool,
    pub actor: &'a str,
}

/// A partial update. Only supplied fields change; each maps to exactly one
/// column assignment.
///
/// `expected_version` enables optimistic concurrency: when set, the update
/// fails with a version conflict unless the row still holds that version,
/// so two racing read-modify-write cycles produce one success and one
/// conflict instead of a silent lost update.
#[derive(Debug, Default)]
pub struct SecretPatch {
    pub value: Option<String>,
    pub description: Option<String>,
    pub is_sensitive: Option<bool>,
    pub expected_version: Option<i64>,
}

/// Create a secret with version 1.
///
/// The value is encrypted under the project's derived key and never read
/// back: the returned `Secret` carries no plaintext.
///
/// # Errors
///
/// Returns `ValidationError` if the key is malformed,
/// `SecretError::AlreadyExists` if the key is taken in this environment,
/// or `CipherError` if encryption fails.
pub fn create_secret(db: &Database, engine: &CipherEngine, new: NewSecret<'_>) -> Result<Secret> {
    validation::validate_secret_key(new.key)?;

    let existing: Option<String> = db
        .conn()
        .query_row(
            "SELECT id FROM secrets WHERE environment_id = ?1 AND key = ?2",
            params![new.environment_id, new.key],
            |row| row.get(0),
        )
        .optional()?;
    if existing.is_some() {
        return Err(SecretError::AlreadyExists(new.key.to_string()).into());
    }

    let encrypted = engine.encrypt(new.value, new.project_id)?;
    let id = Uuid::new_v4().to_string();
    let now = Utc::now();

    db.conn().execute(
        "INSERT INTO secrets (id, environment_id, key, encrypted_value, iv, auth_tag, description, is_sensitive, version, created_by, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 1, ?9, ?10, ?10)",
        params![
            id,
            new.environment_id,
            new.key,
            encrypted.ciphertext,
            encrypted.iv,
            encrypted.auth_tag,
            new.description,
            new.is_sensitive,
            new.actor,
            now.to_rfc3339(),
        ],
    )?;

    debug!(environment = new.environment_id, key = new.key, "secret created");

    Ok(Secret {
        id,
        environment_id: new.environment_id.to_string(),
        key: new.key.to_string(),
        value: None,
        description: new.description.map(str::to_string),
        is_sensitive: new.is_sensitive,
        version: 1,
        created_by: new.actor.to_string(),
        created_at: now,
        updated_at: now,
    })
}

/// List all secrets in an environment, ordered by key.
///
/// With `include_values`, every value is decrypted; a ciphertext that does
/// not authenticate under this project's key is a fatal integrity error,
/// never silently skipped.
///
/// # Errors
///
/// Returns `StoreError` on persistence failures and `CipherError` on
/// decryption failures.
pub fn get_secrets(
    db: &Database,
    engine: &CipherEngine,
    environment_id: &str,
    project_id: &str,
    include_values: bool,
) -> Result<Vec<Secret>> {
    let mut stmt = db.conn().prepare(
        "SELECT id, environment_id, key, encrypted_value, iv, auth_tag, description, is_sensitive, version, created_by, created_at, updated_at
         FROM secrets WHERE environment_id = ?1
         ORDER BY key",
    )?;
    let raws = stmt
        .query_map(params![environment_id], RawSecretRow::read)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut secrets = Vec::with_capacity(raws.len());
    for raw in raws {
        let record = raw.decode()?;
        let value = if include_values {
            Some(engine.decrypt(&record.encrypted, project_id)?)
        } else {
            None
        };
        secrets.push(into_secret(record, value));
    }
    Ok(secrets)
}

/// Look up one secret by key, decrypting its value.
///
/// Returns `Ok(None)` when no such secret exists; absence is not an error
/// at this layer.
///
/// # Errors
///
/// Returns `StoreError` on persistence failures and `CipherError` on
/// decryption failures.
pub fn get_secret(
    db: &Database,
    engine: &CipherEngine,
    environment_id: &str,
    project_id: &str,
    key: &str,
) -> Result<Option<Secret>> {
    let raw = db
        .conn()
        .query_row(
            "SELECT id, environment_id, key, encrypted_value, iv, auth_tag, description, is_sensitive, version, created_by, created_at, updated_at
             FROM secrets WHERE environment_id = ?1 AND key = ?2",
            params![environment_id, key],
            RawSecretRow::read,
        )
        .optional()?;

    match raw {
        Some(raw) => {
            let record = raw.decode()?;
            let value = engine.decrypt(&record.encrypted, project_id)?;
            Ok(Some(into_secret(record, Some(value))))
        }
        None => Ok(None),
    }
}

/// Apply a partial update to a secret in one transaction.
///
/// When the patch carries a new value, the current sealed value and
/// version are snapshotted into history first, then the new value is
/// encrypted with a fresh IV and the version increments by exactly one.
/// Metadata-only patches leave the version untouched. Any failure rolls
/// the whole sequence back: no partial history row, no partial metadata.
///
/// # Errors
///
/// Returns `SecretError::NotFound` if the secret is absent and
/// `SecretError::VersionConflict` if `expected_version` no longer matches.
pub fn update_secret(
    db: &mut Database,
    engine: &CipherEngine,
    environment_id: &str,
    project_id: &str,
    key: &str,
    patch: SecretPatch,
    actor: &str,
) -> Result<Secret> {
    let tx = db.transaction()?;

    let raw = tx
        .query_row(
            "SELECT id, environment_id, key, encrypted_value, iv, auth_tag, description, is_sensitive, version, created_by, created_at, updated_at
             FROM secrets WHERE environment_id = ?1 AND key = ?2",
            params![environment_id, key],
            RawSecretRow::read,
        )
        .optional()?;
    let current = match raw {
        Some(raw) => raw.decode()?,
        None => return Err(SecretError::NotFound(key.to_string()).into()),
    };

    if let Some(expected) = patch.expected_version {
        if expected != current.version {
            // Dropping the transaction rolls it back.
            return Err(SecretError::VersionConflict {
                expected,
                found: current.version,
            }
            .into());
        }
    }

    let now = Utc::now();
    let value_changed = patch.value.is_some();

    let (encrypted, version) = match &patch.value {
        Some(value) => {
            // Snapshot the pre-update state before replacing it.
            tx.execute(
                "INSERT INTO secret_history (id, secret_id, encrypted_value, iv, auth_tag, version, changed_by, changed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    Uuid::new_v4().to_string(),
                    current.id,
                    current.encrypted.ciphertext,
                    current.encrypted.iv,
                    current.encrypted.auth_tag,
                    current.version,
                    actor,
                    now.to_rfc3339(),
                ],
            )?;
            (engine.encrypt(value, project_id)?, current.version + 1)
        }
        None => (current.encrypted.clone(), current.version),
    };

    let description = patch.description.or_else(|| current.description.clone());
    let is_sensitive = patch.is_sensitive.unwrap_or(current.is_sensitive);

    tx.execute(
        "UPDATE secrets SET encrypted_value = ?1, iv = ?2, auth_tag = ?3, description = ?4, is_sensitive = ?5, version = ?6, updated_at = ?7
         WHERE id = ?8",
        params![
            encrypted.ciphertext,
            encrypted.iv,
            encrypted.auth_tag,
            description,
            is_sensitive,
            version,
            now.to_rfc3339(),
            current.id,
        ],
    )?;

    tx.commit()?;

    debug!(
        environment = environment_id,
        key = key,
        value_changed,
        version,
        "secret updated"
    );

    let value = engine.decrypt(&encrypted, project_id)?;
    Ok(Secret {
        id: current.id,
        environment_id: current.environment_id,
        key: current.key,
        value: Some(value),
        description,
        is_sensitive,
        version,
        created_by: current.created_by,
        created_at: current.created_at,
        updated_at: now,
    })
}

/// Delete a secret.
///
/// # Errors
///
/// Returns `SecretError::NotFound` if no secret matches.
pub fn delete_secret(db: &Database, environment_id: &str, key: &str) -> Result<()> {
    let affected = db.conn().execute(
        "DELETE FROM secrets WHERE environment_id = ?1 AND key = ?2",
        params![environment_id, key],
    )?;
    if affected == 0 {
        return Err(SecretError::NotFound(key.to_string()).into());
    }
    debug!(environment = environment_id, key = key, "secret deleted");
    Ok(())
}

/// Fetch a secret's history, newest version first.
///
/// Each record holds the sealed value that was live immediately before the
/// corresponding update.
///
/// # Errors
///
/// Returns `StoreError` on persistence failures.
pub fn get_secret_history(db: &Database, secret_id: &str) -> Result<Vec<SecretVersion>> {
    let mut stmt = db.conn().prepare(
        "SELECT id, secret_id, encrypted_value, iv, auth_tag, version, changed_by, changed_at
         FROM secret_history WHERE secret_id = ?1
         ORDER BY version DESC",
    )?;
    let raws = stmt
        .query_map(params![secret_id], RawHistoryRow::read)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    raws.into_iter().map(RawHistoryRow::decode).collect()
}

fn into_secret(record: SecretRecord, value: Option<Zeroizing<String>>) -> Secret {
    Secret {
        id: record.id,
        environment_id: record.environment_id,
        key: record.key,
        value,
        description: record.description,
        is_sensitive: record.is_sensitive,
        version: record.version,
        created_by: record.created_by,
        created_at: record.created_at,
        updated_at: record.updated_at,
    }
}
