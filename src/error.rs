//! Error types for coffer operations.
//!
//! Each subsystem has its own error enum; `CofferError` folds them together
//! so callers can match broadly or inspect the transport-facing [`ErrorKind`].

use thiserror::Error;

/// Cryptographic errors from the cipher engine.
#[derive(Error, Debug)]
pub enum CipherError {
    #[error("master key is not configured: set {0}")]
    MasterKeyMissing(&'static str),

    #[error("invalid master key: must be {expected} hex characters, got {got}")]
    InvalidMasterKey { expected: usize, got: usize },

    #[error("invalid master key: not valid hex: {0}")]
    MasterKeyNotHex(String),

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("integrity check failed: ciphertext does not authenticate under this project's key")]
    IntegrityCheckFailed,

    #[error("invalid encrypted payload: {0}")]
    InvalidPayload(String),

    #[error("random number generation failed: {0}")]
    RngFailed(String),
}

/// Secret store errors.
#[derive(Error, Debug)]
pub enum SecretError {
    #[error("secret not found: {0}")]
    NotFound(String),

    #[error("secret already exists in this environment: {0}")]
    AlreadyExists(String),

    #[error("secret version changed underneath this update: expected {expected}, found {found}")]
    VersionConflict { expected: i64, found: i64 },
}

/// Authorization errors from the permission resolver.
#[derive(Error, Debug)]
pub enum AccessError {
    #[error("no caller identity")]
    Unauthorized,

    #[error("not a member of this team")]
    NotAMember,

    #[error("insufficient team role: {held} is below the required level")]
    InsufficientRole { held: String },

    #[error("insufficient project permission: {held} is below the required level")]
    InsufficientPermission { held: String },
}

/// Team membership errors from the ownership guard.
#[derive(Error, Debug)]
pub enum TeamError {
    #[error("team member not found")]
    MemberNotFound,

    #[error("user is already a member of this team")]
    AlreadyMember,

    #[error("cannot demote the last owner")]
    LastOwnerDemotion,

    #[error("cannot remove the last owner")]
    LastOwnerRemoval,
}

/// Input validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("secret key cannot be empty")]
    EmptyKey,

    #[error("invalid secret key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("team ID is required")]
    MissingTeamId,

    #[error("project ID is required")]
    MissingProjectId,
}

/// Persistence errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("malformed {entity} row: bad {column}: {reason}")]
    MalformedRow {
        entity: &'static str,
        column: &'static str,
        reason: String,
    },
}

/// Top-level error type for all coffer operations.
#[derive(Error, Debug)]
pub enum CofferError {
    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error(transparent)]
    Secret(#[from] SecretError),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Team(#[from] TeamError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<rusqlite::Error> for CofferError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Store(StoreError::Sqlite(err))
    }
}

/// Coarse classification of an error, for the boundary layer to map to
/// transport status codes. The core only preserves the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Authentication,
    Authorization,
    NotFound,
    Conflict,
    Integrity,
    Internal,
}

impl CofferError {
    /// Classify this error into its transport-facing kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Cipher(CipherError::IntegrityCheckFailed) => ErrorKind::Integrity,
            Self::Cipher(CipherError::MasterKeyMissing(_))
            | Self::Cipher(CipherError::InvalidMasterKey { .. })
            | Self::Cipher(CipherError::MasterKeyNotHex(_)) => ErrorKind::Validation,
            Self::Cipher(_) => ErrorKind::Internal,

            Self::Secret(SecretError::NotFound(_)) => ErrorKind::NotFound,
            Self::Secret(SecretError::AlreadyExists(_))
            | Self::Secret(SecretError::VersionConflict { .. }) => ErrorKind::Conflict,

            Self::Access(AccessError::Unauthorized) => ErrorKind::Authentication,
            Self::Access(_) => ErrorKind::Authorization,

            Self::Team(TeamError::MemberNotFound) => ErrorKind::NotFound,
            Self::Team(_) => ErrorKind::Conflict,

            Self::Validation(_) => ErrorKind::Validation,

            Self::Store(_) => ErrorKind::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, CofferError>;
