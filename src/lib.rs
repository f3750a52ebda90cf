//! Coffer - envelope-encrypted, permission-gated secret storage core.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── error            # Error enums and the transport-facing kind taxonomy
//! └── core/            # Core library components
//!     ├── config       # Master key configuration
//!     ├── cipher/      # Envelope encryption (HKDF + AES-256-GCM)
//!     ├── domain/      # Secrets, roles, permissions
//!     ├── store/       # SQLite persistence and row decoding
//!     ├── secrets      # Versioned secret CRUD
//!     ├── env          # KEY=value import/export
//!     ├── access       # Team role and project permission resolution
//!     └── team         # Membership mutations with owner protection
//! ```
//!
//! # Features
//!
//! - One data-encryption key per project, derived from a single master key
//! - AES-256-GCM authenticated encryption with per-write random IVs
//! - Full version history for every secret value change
//! - Role hierarchy plus raise-only per-project permission overrides
//! - Teams can never lose their last owner

pub mod core;
pub mod error;
