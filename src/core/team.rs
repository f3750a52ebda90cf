//! Team membership mutations.
//!
//! Every mutation runs its invariant check and its write inside one
//! transaction, upholding the rule that a team with members never loses
//! its last owner.

use rusqlite::{params, OptionalExtension, Transaction};
use tracing::debug;

use crate::core::domain::{TeamMembership, TeamRole};
use crate::core::store::{decode_role, Database};
use crate::error::{Result, TeamError};

/// Add a member to a team.
///
/// # Errors
///
/// Returns `TeamError::AlreadyMember` if the (team, user) pair exists.
pub fn add_member(
    db: &mut Database,
    team_id: &str,
    user_id: &str,
    role: TeamRole,
) -> Result<TeamMembership> {
    let tx = db.transaction()?;

    if current_role(&tx, team_id, user_id)?.is_some() {
        return Err(TeamError::AlreadyMember.into());
    }

    tx.execute(
        "INSERT INTO team_members (team_id, user_id, role) VALUES (?1, ?2, ?3)",
        params![team_id, user_id, role.as_str()],
    )?;
    tx.commit()?;

    debug!(team = team_id, user = user_id, role = %role, "member added");

    Ok(TeamMembership {
        team_id: team_id.to_string(),
        user_id: user_id.to_string(),
        role,
    })
}

/// Change a member's role.
///
/// Demoting the only owner is refused: a team that has members must keep
/// at least one owner.
///
/// # Errors
///
/// Returns `TeamError::MemberNotFound` if there is no membership row and
/// `TeamError::LastOwnerDemotion` on a last-owner demotion.
pub fn update_member_role(
    db: &mut Database,
    team_id: &str,
    user_id: &str,
    new_role: TeamRole,
) -> Result<()> {
    let tx = db.transaction()?;

    let current = match current_role(&tx, team_id, user_id)? {
        Some(role) => role,
        None => return Err(TeamError::MemberNotFound.into()),
    };

    if current == TeamRole::Owner && new_role != TeamRole::Owner {
        let other_owners: i64 = tx.query_row(
            "SELECT COUNT(*) FROM team_members
             WHERE team_id = ?1 AND role = 'owner' AND user_id != ?2",
            params![team_id, user_id],
            |row| row.get(0),
        )?;
        if other_owners == 0 {
            return Err(TeamError::LastOwnerDemotion.into());
        }
    }

    tx.execute(
        "UPDATE team_members SET role = ?3 WHERE team_id = ?1 AND user_id = ?2",
        params![team_id, user_id, new_role.as_str()],
    )?;
    tx.commit()?;

    debug!(team = team_id, user = user_id, role = %new_role, "member role updated");
    Ok(())
}

/// Remove a member from a team.
///
/// Removing the only owner is refused.
///
/// # Errors
///
/// Returns `TeamError::MemberNotFound` if there is no membership row and
/// `TeamError::LastOwnerRemoval` on a last-owner removal.
pub fn remove_member(db: &mut Database, team_id: &str, user_id: &str) -> Result<()> {
    let tx = db.transaction()?;

    let current = match current_role(&tx, team_id, user_id)? {
        Some(role) => role,
        None => return Err(TeamError::MemberNotFound.into()),
    };

    if current == TeamRole::Owner {
        let owners: i64 = tx.query_row(
            "SELECT COUNT(*) FROM team_members WHERE team_id = ?1 AND role = 'owner'",
            params![team_id],
            |row| row.get(0),
        )?;
        if owners <= 1 {
            return Err(TeamError::LastOwnerRemoval.into());
        }
    }

    tx.execute(
        "DELETE FROM team_members WHERE team_id = ?1 AND user_id = ?2",
        params![team_id, user_id],
    )?;
    tx.commit()?;

    debug!(team = team_id, user = user_id, "member removed");
    Ok(())
}

/// List a team's memberships, ordered by role then user.
///
/// # Errors
///
/// Returns `StoreError` on persistence failures.
pub fn members(db: &Database, team_id: &str) -> Result<Vec<TeamMembership>> {
    let mut stmt = db.conn().prepare(
        "SELECT team_id, user_id, role FROM team_members
         WHERE team_id = ?1
         ORDER BY role, user_id",
    )?;
    let raws = stmt
        .query_map(params![team_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    raws.into_iter()
        .map(|(team_id, user_id, raw_role)| {
            Ok(TeamMembership {
                team_id,
                user_id,
                role: decode_role(&raw_role)?,
            })
        })
        .collect()
}

fn current_role(tx: &Transaction<'_>, team_id: &str, user_id: &str) -> Result<Option<TeamRole>> {
    let raw: Option<String> = tx
        .query_row(
            "SELECT role FROM team_members WHERE team_id = ?1 AND user_id = ?2",
            params![team_id, user_id],
            |row| row.get(0),
        )
        .optional()?;
    raw.map(|r| decode_role(&r)).transpose()
}
