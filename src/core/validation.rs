//! Input validation for coffer operations.
//!
//! Validates secret key names before they reach the store.

use crate::error::{Result, ValidationError};

/// Validate a secret key name.
///
/// Secret keys follow the conventional environment-variable shape:
/// - Must start with an uppercase letter
/// - May contain only A-Z, 0-9, and underscore
/// - Cannot be empty
///
/// # Errors
///
/// Returns `ValidationError` if the key is invalid.
pub fn validate_secret_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(ValidationError::EmptyKey.into());
    }

    if let Some(first_char) = key.chars().next() {
        if !first_char.is_ascii_uppercase() {
            return Err(ValidationError::InvalidKey {
                key: key.to_string(),
                reason: "must start with an uppercase letter".to_string(),
            }
            .into());
        }
    }

    for (i, ch) in key.chars().enumerate().skip(1) {
        if !ch.is_ascii_uppercase() && !ch.is_ascii_digit() && ch != '_' {
            return Err(ValidationError::InvalidKey {
                key: key.to_string(),
                reason: format!(
                    "invalid character '{}' at position {}. Only A-Z, 0-9, and underscore are allowed",
                    ch,
                    i + 1
                ),
            }
            .into());
        }
    }

    Ok(())
}
