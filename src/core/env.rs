//! Import and export in dotenv format.
//!
//! `KEY=value` lines in, `KEY=value` lines out. No quoting or escaping
//! happens at this layer; that is a boundary concern.

use tracing::{debug, info};

use crate::core::cipher::CipherEngine;
use crate::core::secrets::{self, NewSecret};
use crate::core::store::Database;
use crate::core::validation;
use crate::error::{CofferError, Result, SecretError};

/// Export an environment's secrets as `KEY=value` lines.
///
/// Values are decrypted; keys come out in lexicographic order.
///
/// # Errors
///
/// Returns an error if listing or decryption fails.
pub fn export_env(
    db: &Database,
    engine: &CipherEngine,
    environment_id: &str,
    project_id: &str,
) -> Result<String> {
    let all = secrets::get_secrets(db, engine, environment_id, project_id, true)?;

    let lines: Vec<String> = all
        .iter()
        .map(|s| {
            let value = s.value.as_ref().map(|v| v.as_str()).unwrap_or("");
            format!("{}={}", s.key, value)
        })
        .collect();

    Ok(lines.join("\n"))
}

/// Import secrets from dotenv-formatted text, best effort.
///
/// Blank lines, `#` comments, and lines that do not look like a
/// `KEY=value` pair are ignored. Keys that already exist in the
/// environment are skipped. Imported secrets are marked sensitive and
/// carry no description.
///
/// # Returns
///
/// The number of secrets actually created, which can be lower than the
/// number of well-formed lines when duplicates are skipped.
///
/// # Errors
///
/// Returns an error if encryption or persistence fails; only the
/// duplicate-key conflict is swallowed.
pub fn import_env(
    db: &Database,
    engine: &CipherEngine,
    environment_id: &str,
    project_id: &str,
    content: &str,
    actor: &str,
) -> Result<usize> {
    let mut created = 0;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        if validation::validate_secret_key(key).is_err() {
            continue;
        }

        let result = secrets::create_secret(
            db,
            engine,
            NewSecret {
                environment_id,
                project_id,
                key,
                value,
                description: None,
                is_sensitive: true,
                actor,
            },
        );

        match result {
            Ok(_) => created += 1,
            Err(CofferError::Secret(SecretError::AlreadyExists(_))) => {
                debug!(key = key, "import skipped existing key");
            }
            Err(e) => return Err(e),
        }
    }

    info!(environment = environment_id, created, "imported secrets");
    Ok(created)
}
