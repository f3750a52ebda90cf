//! Master key configuration.
//!
//! The master key reaches the process exactly one way: a 64-character hex
//! string in the environment. It is validated here, eagerly, and handed to
//! the cipher engine as an explicit value rather than read lazily on first
//! use.

use tracing::debug;

use crate::core::cipher::MasterKey;
use crate::core::constants::MASTER_KEY_ENV;
use crate::error::{CipherError, Result};

/// Load the master key from the `COFFER_MASTER_KEY` environment variable.
///
/// # Errors
///
/// Returns `CipherError::MasterKeyMissing` if the variable is unset, or the
/// underlying validation error if it is set but malformed.
pub fn load_master_key() -> Result<MasterKey> {
    let hex_str =
        std::env::var(MASTER_KEY_ENV).map_err(|_| CipherError::MasterKeyMissing(MASTER_KEY_ENV))?;

    let key = MasterKey::from_hex(&hex_str)?;
    debug!(source = MASTER_KEY_ENV, "master key loaded");
    Ok(key)
}
