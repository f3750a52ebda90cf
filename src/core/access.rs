//! Access resolution.
//!
//! Two gates, each over its own strict hierarchy: team roles
//! (owner > admin > member > viewer) and project permissions
//! (admin > write > read). A request passes a gate when the caller's
//! resolved level is at least the *minimum* level among the allowed set.

use rusqlite::{params, OptionalExtension};
use tracing::debug;

use crate::core::domain::{PermissionOverride, ProjectPermission, TeamRole};
use crate::core::store::{decode_permission, decode_role, Database};
use crate::error::{AccessError, Result, ValidationError};

/// Require that the caller holds a sufficient role on a team.
///
/// Resolves the caller's membership and checks it against the weakest role
/// in `allowed_roles`. The resolved role is returned so the caller can
/// expose it downstream.
///
/// # Errors
///
/// Returns `AccessError::Unauthorized` with no caller identity,
/// `ValidationError::MissingTeamId` with an empty team ID, and
/// `AccessError` when the caller is not a member or outranked.
pub fn require_team_role(
    db: &Database,
    caller: Option<&str>,
    team_id: &str,
    allowed_roles: &[TeamRole],
) -> Result<TeamRole> {
    let caller = caller.ok_or(AccessError::Unauthorized)?;
    if team_id.is_empty() {
        return Err(ValidationError::MissingTeamId.into());
    }

    let raw: Option<String> = db
        .conn()
        .query_row(
            "SELECT role FROM team_members WHERE team_id = ?1 AND user_id = ?2",
            params![team_id, caller],
            |row| row.get(0),
        )
        .optional()?;
    let role = match raw {
        Some(raw) => decode_role(&raw)?,
        None => return Err(AccessError::NotAMember.into()),
    };

    let min_required = allowed_roles.iter().map(|r| r.level()).min().unwrap_or(u8::MAX);
    if role.level() < min_required {
        debug!(team = team_id, user = caller, role = %role, "team role check denied");
        return Err(AccessError::InsufficientRole {
            held: role.to_string(),
        }
        .into());
    }

    Ok(role)
}

/// Require that the caller holds a sufficient permission on a project,
/// optionally scoped to one environment.
///
/// The baseline comes from the caller's role on the team owning the
/// project: owner and admin map to `admin`, member maps to `write`, and
/// everything else resolves to `read`. That includes callers with no
/// membership row at all; see DESIGN.md before relying on a read-gated
/// route for isolation. An explicit override row can then raise, never
/// lower, the baseline; a row scoped to `environment_id` wins over the
/// project-wide row.
///
/// # Errors
///
/// Returns `AccessError::Unauthorized` with no caller identity,
/// `ValidationError::MissingProjectId` with an empty project ID, and
/// `AccessError::InsufficientPermission` below the required level.
pub fn require_project_permission(
    db: &Database,
    caller: Option<&str>,
    project_id: &str,
    environment_id: Option<&str>,
    allowed_permissions: &[ProjectPermission],
) -> Result<ProjectPermission> {
    let caller = caller.ok_or(AccessError::Unauthorized)?;
    if project_id.is_empty() {
        return Err(ValidationError::MissingProjectId.into());
    }

    let team_role: Option<String> = db
        .conn()
        .query_row(
            "SELECT tm.role FROM team_members tm
             JOIN projects p ON p.team_id = tm.team_id
             WHERE p.id = ?1 AND tm.user_id = ?2",
            params![project_id, caller],
            |row| row.get(0),
        )
        .optional()?;

    let mut permission = match team_role {
        Some(raw) => match decode_role(&raw)? {
            TeamRole::Owner | TeamRole::Admin => ProjectPermission::Admin,
            TeamRole::Member => ProjectPermission::Write,
            TeamRole::Viewer => ProjectPermission::Read,
        },
        None => ProjectPermission::Read,
    };

    if let Some(grant) = preferred_override(db, caller, project_id, environment_id)? {
        // Overrides raise; they never downgrade the baseline.
        if grant.permission.level() > permission.level() {
            permission = grant.permission;
        }
    }

    let min_required = allowed_permissions
        .iter()
        .map(|p| p.level())
        .min()
        .unwrap_or(u8::MAX);
    if permission.level() < min_required {
        debug!(
            project = project_id,
            user = caller,
            permission = %permission,
            "project permission check denied"
        );
        return Err(AccessError::InsufficientPermission {
            held: permission.to_string(),
        }
        .into());
    }

    Ok(permission)
}

/// The override row that applies to this caller, if any.
///
/// When both an environment-scoped row and a project-wide row exist, the
/// environment-scoped one wins.
fn preferred_override(
    db: &Database,
    user_id: &str,
    project_id: &str,
    environment_id: Option<&str>,
) -> Result<Option<PermissionOverride>> {
    let row: Option<(Option<String>, String)> = db
        .conn()
        .query_row(
            "SELECT environment_id, permission FROM project_permissions
             WHERE project_id = ?1 AND user_id = ?2
             AND (environment_id IS NULL OR environment_id = ?3)
             ORDER BY CASE WHEN environment_id IS NOT NULL THEN 0 ELSE 1 END
             LIMIT 1",
            params![project_id, user_id, environment_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    row.map(|(environment_id, raw)| {
        Ok(PermissionOverride {
            project_id: project_id.to_string(),
            user_id: user_id.to_string(),
            environment_id,
            permission: decode_permission(&raw)?,
        })
    })
    .transpose()
}
