//! Project permissions and overrides.

use serde::{Deserialize, Serialize};

use crate::core::types::{EnvironmentId, ProjectId, UserId};

/// Access level over a project. A strict total order:
/// admin > write > read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectPermission {
    Admin,
    Write,
    Read,
}

impl ProjectPermission {
    /// Position in the permission hierarchy; a higher value outranks a
    /// lower one.
    pub fn level(self) -> u8 {
        match self {
            Self::Admin => 3,
            Self::Write => 2,
            Self::Read => 1,
        }
    }

    /// Canonical text form, as persisted.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Write => "write",
            Self::Read => "read",
        }
    }

    /// Parse the persisted text form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Self::Admin),
            "write" => Some(Self::Write),
            "read" => Some(Self::Read),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProjectPermission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An explicit permission grant for one user on one project.
///
/// A row with a concrete `environment_id` takes precedence over the
/// project-wide row (`environment_id = None`) for the same user. Overrides
/// can only raise a caller's effective permission, never lower it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionOverride {
    pub project_id: ProjectId,
    pub user_id: UserId,
    pub environment_id: Option<EnvironmentId>,
    pub permission: ProjectPermission,
}
