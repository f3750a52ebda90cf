//! Type aliases for domain concepts.
//!
//! Provides semantic type aliases to make function signatures more descriptive.

/// A secret key name (e.g., DATABASE_URL, API_KEY).
///
/// Must start with an uppercase letter and contain only A-Z, 0-9, underscore.
pub type SecretKey = String;

/// A project identifier. Scopes key derivation: every project gets its own
/// data-encryption key.
pub type ProjectId = String;

/// An environment identifier (e.g., development, staging, production).
pub type EnvironmentId = String;

/// A team identifier.
pub type TeamId = String;

/// A user identifier.
pub type UserId = String;
