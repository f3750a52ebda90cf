//! Row decoding.
//!
//! Explicit, total conversions from persisted rows to domain structs. Raw
//! readers pull column values inside rusqlite's row callback; `decode`
//! turns them into typed structs, so a malformed timestamp or an unknown
//! role in the database surfaces as a typed error instead of a panic or a
//! silently wrong field.

use chrono::{DateTime, Utc};
use rusqlite::Row;

use crate::core::cipher::EncryptedValue;
use crate::core::domain::{ProjectPermission, SecretVersion, TeamRole};
use crate::error::{Result, StoreError};

/// A `secrets` row with the ciphertext still sealed.
#[derive(Debug, Clone)]
pub(crate) struct SecretRecord {
    pub id: String,
    pub environment_id: String,
    pub key: String,
    pub encrypted: EncryptedValue,
    pub description: Option<String>,
    pub is_sensitive: bool,
    pub version: i64,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Column order: id, environment_id, key, encrypted_value, iv, auth_tag,
/// description, is_sensitive, version, created_by, created_at, updated_at.
pub(crate) struct RawSecretRow {
    id: String,
    environment_id: String,
    key: String,
    encrypted_value: String,
    iv: String,
    auth_tag: String,
    description: Option<String>,
    is_sensitive: bool,
    version: i64,
    created_by: String,
    created_at: String,
    updated_at: String,
}

impl RawSecretRow {
    pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            environment_id: row.get(1)?,
            key: row.get(2)?,
            encrypted_value: row.get(3)?,
            iv: row.get(4)?,
            auth_tag: row.get(5)?,
            description: row.get(6)?,
            is_sensitive: row.get(7)?,
            version: row.get(8)?,
            created_by: row.get(9)?,
            created_at: row.get(10)?,
            updated_at: row.get(11)?,
        })
    }

    pub fn decode(self) -> Result<SecretRecord> {
        Ok(SecretRecord {
            created_at: parse_timestamp("secrets", "created_at", &self.created_at)?,
            updated_at: parse_timestamp("secrets", "updated_at", &self.updated_at)?,
            id: self.id,
            environment_id: self.environment_id,
            key: self.key,
            encrypted: EncryptedValue {
                ciphertext: self.encrypted_value,
                iv: self.iv,
                auth_tag: self.auth_tag,
            },
            description: self.description,
            is_sensitive: self.is_sensitive,
            version: self.version,
            created_by: self.created_by,
        })
    }
}

/// Column order: id, secret_id, encrypted_value, iv, auth_tag, version,
/// changed_by, changed_at.
pub(crate) struct RawHistoryRow {
    id: String,
    secret_id: String,
    encrypted_value: String,
    iv: String,
    auth_tag: String,
    version: i64,
    changed_by: String,
    changed_at: String,
}

impl RawHistoryRow {
    pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            secret_id: row.get(1)?,
            encrypted_value: row.get(2)?,
            iv: row.get(3)?,
            auth_tag: row.get(4)?,
            version: row.get(5)?,
            changed_by: row.get(6)?,
            changed_at: row.get(7)?,
        })
    }

    pub fn decode(self) -> Result<SecretVersion> {
        Ok(SecretVersion {
            changed_at: parse_timestamp("secret_history", "changed_at", &self.changed_at)?,
            id: self.id,
            secret_id: self.secret_id,
            encrypted: EncryptedValue {
                ciphertext: self.encrypted_value,
                iv: self.iv,
                auth_tag: self.auth_tag,
            },
            version: self.version,
            changed_by: self.changed_by,
        })
    }
}

/// Decode a persisted team role.
pub(crate) fn decode_role(raw: &str) -> Result<TeamRole> {
    TeamRole::parse(raw).ok_or_else(|| {
        StoreError::MalformedRow {
            entity: "team_members",
            column: "role",
            reason: format!("unknown role '{}'", raw),
        }
        .into()
    })
}

/// Decode a persisted project permission.
pub(crate) fn decode_permission(raw: &str) -> Result<ProjectPermission> {
    ProjectPermission::parse(raw).ok_or_else(|| {
        StoreError::MalformedRow {
            entity: "project_permissions",
            column: "permission",
            reason: format!("unknown permission '{}'", raw),
        }
        .into()
    })
}

/// Parse an RFC 3339 timestamp column.
pub(crate) fn parse_timestamp(
    entity: &'static str,
    column: &'static str,
    raw: &str,
) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            StoreError::MalformedRow {
                entity,
                column,
                reason: e.to_string(),
            }
            .into()
        })
}
