//! Test support utilities for coffer integration tests.
//!
//! Provides a shared cipher engine, an in-memory database, and seeding
//! helpers for the tables the surrounding system normally owns.

#![allow(dead_code)]

use coffer::core::cipher::CipherEngine;
use coffer::core::domain::TeamRole;
use coffer::core::secrets::{self, NewSecret, SecretPatch};
use coffer::core::store::Database;
use coffer::core::team;
use coffer::error::Result;
use rusqlite::params;

pub const TEAM: &str = "team-1";
pub const PROJECT: &str = "project-1";
pub const ENV_DEV: &str = "env-dev";
pub const ENV_PROD: &str = "env-prod";
pub const ACTOR: &str = "user-1";

/// A deterministic test master key.
pub fn engine() -> CipherEngine {
    CipherEngine::from_hex(&"ab".repeat(32)).unwrap()
}

/// An engine with a different master key, for isolation tests.
pub fn other_engine() -> CipherEngine {
    CipherEngine::from_hex(&"cd".repeat(32)).unwrap()
}

pub fn db() -> Database {
    Database::open_in_memory().unwrap()
}

/// A database with the default project owned by the default team.
pub fn db_with_project() -> Database {
    let db = db();
    seed_project(&db, PROJECT, TEAM);
    db
}

pub fn seed_project(db: &Database, project_id: &str, team_id: &str) {
    db.execute(
        "INSERT INTO projects (id, team_id) VALUES (?1, ?2)",
        params![project_id, team_id],
    )
    .unwrap();
}

pub fn seed_member(db: &mut Database, team_id: &str, user_id: &str, role: TeamRole) {
    team::add_member(db, team_id, user_id, role).unwrap();
}

pub fn seed_override(
    db: &Database,
    project_id: &str,
    user_id: &str,
    environment_id: Option<&str>,
    permission: &str,
) {
    db.execute(
        "INSERT INTO project_permissions (project_id, user_id, environment_id, permission)
         VALUES (?1, ?2, ?3, ?4)",
        params![project_id, user_id, environment_id, permission],
    )
    .unwrap();
}

/// Create a secret with default metadata in the default environment.
pub fn create(db: &Database, engine: &CipherEngine, key: &str, value: &str) -> Result<()> {
    secrets::create_secret(
        db,
        engine,
        NewSecret {
            environment_id: ENV_DEV,
            project_id: PROJECT,
            key,
            value,
            description: None,
            is_sensitive: true,
            actor: ACTOR,
        },
    )
    .map(|_| ())
}

/// Update only the value of a secret in the default environment.
pub fn update_value(db: &mut Database, engine: &CipherEngine, key: &str, value: &str) {
    secrets::update_secret(
        db,
        engine,
        ENV_DEV,
        PROJECT,
        key,
        SecretPatch {
            value: Some(value.to_string()),
            ..Default::default()
        },
        ACTOR,
    )
    .unwrap();
}
