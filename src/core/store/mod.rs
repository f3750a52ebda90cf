//! SQLite persistence.
//!
//! `Database` wraps one `rusqlite` connection: schema bootstrap on open,
//! scoped transactions for the multi-statement operations, and a
//! passthrough for the tables the surrounding system owns but this core
//! only reads (projects, permission grants).
//!
//! Atomic sequences take a `rusqlite::Transaction`: commit is explicit,
//! and dropping the handle on any early return rolls everything back.

use rusqlite::{Connection, Transaction};
use tracing::debug;

use crate::error::Result;

mod rows;

pub(crate) use rows::{decode_permission, decode_role, RawHistoryRow, RawSecretRow, SecretRecord};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS secrets (
    id TEXT PRIMARY KEY,
    environment_id TEXT NOT NULL,
    key TEXT NOT NULL,
    encrypted_value TEXT NOT NULL,
    iv TEXT NOT NULL,
    auth_tag TEXT NOT NULL,
    description TEXT,
    is_sensitive INTEGER NOT NULL DEFAULT 1,
    version INTEGER NOT NULL DEFAULT 1,
    created_by TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (environment_id, key)
);

CREATE TABLE IF NOT EXISTS secret_history (
    id TEXT PRIMARY KEY,
    secret_id TEXT NOT NULL REFERENCES secrets(id) ON DELETE CASCADE,
    encrypted_value TEXT NOT NULL,
    iv TEXT NOT NULL,
    auth_tag TEXT NOT NULL,
    version INTEGER NOT NULL,
    changed_by TEXT NOT NULL,
    changed_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS team_members (
    team_id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    role TEXT NOT NULL,
    UNIQUE (team_id, user_id)
);

CREATE TABLE IF NOT EXISTS project_permissions (
    project_id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    environment_id TEXT,
    permission TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS projects (
    id TEXT PRIMARY KEY,
    team_id TEXT NOT NULL
);
";

/// Handle to the secrets database.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (creating if necessary) a database file and bootstrap the schema.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the file cannot be opened or the schema
    /// statements fail.
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        debug!(path = %path.as_ref().display(), "opening database");
        let conn = Connection::open(path)?;
        Self::bootstrap(conn)
    }

    /// Open an in-memory database. Used by tests and ephemeral callers.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the schema statements fail.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::bootstrap(conn)
    }

    fn bootstrap(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Run a statement against the underlying connection.
    ///
    /// The surrounding system owns the `projects` and `project_permissions`
    /// tables that this core only reads; the passthrough lets it manage
    /// them without a second connection.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on any SQLite failure.
    pub fn execute<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<usize> {
        Ok(self.conn.execute(sql, params)?)
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Begin a scoped transaction. Dropped without commit = rolled back.
    pub(crate) fn transaction(&mut self) -> Result<Transaction<'_>> {
        Ok(self.conn.transaction()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        // Re-running the schema batch must not fail.
        db.conn().execute_batch(SCHEMA).unwrap();
    }

    #[test]
    fn test_unique_environment_key() {
        let db = Database::open_in_memory().unwrap();
        let insert = "INSERT INTO secrets (id, environment_id, key, encrypted_value, iv, auth_tag, created_by, created_at, updated_at)
                      VALUES (?1, ?2, ?3, 'ct', 'iv', 'tag', 'u1', 't', 't')";
        db.execute(insert, rusqlite::params!["s1", "env-1", "API_KEY"])
            .unwrap();
        assert!(db
            .execute(insert, rusqlite::params!["s2", "env-1", "API_KEY"])
            .is_err());
        // Same key in another environment is fine.
        db.execute(insert, rusqlite::params!["s3", "env-2", "API_KEY"])
            .unwrap();
    }
}
