//! Tests for team-role and project-permission resolution.

mod support;

use coffer::core::access;
use coffer::core::domain::{ProjectPermission, TeamRole};
use coffer::error::{AccessError, CofferError, ErrorKind};
use support::{PROJECT, TEAM};

#[test]
fn test_no_caller_is_unauthorized() {
    let db = support::db_with_project();

    let err = access::require_team_role(&db, None, TEAM, &[TeamRole::Viewer]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authentication);

    let err =
        access::require_project_permission(&db, None, PROJECT, None, &[ProjectPermission::Read])
            .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authentication);
}

#[test]
fn test_missing_identifiers_are_validation_errors() {
    let db = support::db_with_project();

    let err = access::require_team_role(&db, Some("u1"), "", &[TeamRole::Viewer]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err =
        access::require_project_permission(&db, Some("u1"), "", None, &[ProjectPermission::Read])
            .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn test_non_member_is_forbidden_on_team_routes() {
    let db = support::db_with_project();

    let err = access::require_team_role(&db, Some("stranger"), TEAM, &[TeamRole::Viewer])
        .unwrap_err();
    assert!(matches!(err, CofferError::Access(AccessError::NotAMember)));
    assert_eq!(err.kind(), ErrorKind::Authorization);
}

#[test]
fn test_team_role_minimum_is_weakest_allowed() {
    let mut db = support::db_with_project();
    support::seed_member(&mut db, TEAM, "admin-user", TeamRole::Admin);
    support::seed_member(&mut db, TEAM, "viewer-user", TeamRole::Viewer);

    // Allowed {owner, admin}: minimum is admin.
    let resolved = access::require_team_role(
        &db,
        Some("admin-user"),
        TEAM,
        &[TeamRole::Owner, TeamRole::Admin],
    )
    .unwrap();
    assert_eq!(resolved, TeamRole::Admin);

    let err = access::require_team_role(
        &db,
        Some("viewer-user"),
        TEAM,
        &[TeamRole::Owner, TeamRole::Admin],
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);

    // A viewer passes a viewer-level gate.
    access::require_team_role(&db, Some("viewer-user"), TEAM, &[TeamRole::Viewer]).unwrap();
}

#[test]
fn test_baseline_from_team_role() {
    let mut db = support::db_with_project();
    support::seed_member(&mut db, TEAM, "owner-user", TeamRole::Owner);
    support::seed_member(&mut db, TEAM, "admin-user", TeamRole::Admin);
    support::seed_member(&mut db, TEAM, "member-user", TeamRole::Member);
    support::seed_member(&mut db, TEAM, "viewer-user", TeamRole::Viewer);

    for (user, expected) in [
        ("owner-user", ProjectPermission::Admin),
        ("admin-user", ProjectPermission::Admin),
        ("member-user", ProjectPermission::Write),
        ("viewer-user", ProjectPermission::Read),
    ] {
        let resolved = access::require_project_permission(
            &db,
            Some(user),
            PROJECT,
            None,
            &[ProjectPermission::Read],
        )
        .unwrap();
        assert_eq!(resolved, expected, "baseline for {}", user);
    }
}

#[test]
fn test_no_membership_still_defaults_to_read() {
    // An authenticated caller with no team membership at all resolves to
    // a read baseline. Deliberate; see DESIGN.md.
    let db = support::db_with_project();

    let resolved = access::require_project_permission(
        &db,
        Some("complete-stranger"),
        PROJECT,
        None,
        &[ProjectPermission::Read],
    )
    .unwrap();
    assert_eq!(resolved, ProjectPermission::Read);

    let err = access::require_project_permission(
        &db,
        Some("complete-stranger"),
        PROJECT,
        None,
        &[ProjectPermission::Write],
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);
}

#[test]
fn test_override_raises_baseline() {
    let mut db = support::db_with_project();
    support::seed_member(&mut db, TEAM, "viewer-user", TeamRole::Viewer);
    support::seed_override(&db, PROJECT, "viewer-user", None, "write");

    let resolved = access::require_project_permission(
        &db,
        Some("viewer-user"),
        PROJECT,
        None,
        &[ProjectPermission::Write],
    )
    .unwrap();
    assert_eq!(resolved, ProjectPermission::Write);
}

#[test]
fn test_override_never_downgrades() {
    let mut db = support::db_with_project();
    support::seed_member(&mut db, TEAM, "member-user", TeamRole::Member);
    // A read override below the member's write baseline changes nothing.
    support::seed_override(&db, PROJECT, "member-user", None, "read");

    let resolved = access::require_project_permission(
        &db,
        Some("member-user"),
        PROJECT,
        None,
        &[ProjectPermission::Write],
    )
    .unwrap();
    assert_eq!(resolved, ProjectPermission::Write);
}

#[test]
fn test_environment_scoped_override_applies_to_that_environment_only() {
    let mut db = support::db_with_project();
    support::seed_member(&mut db, TEAM, "viewer-user", TeamRole::Viewer);
    support::seed_override(&db, PROJECT, "viewer-user", Some("env-prod"), "admin");

    let in_prod = access::require_project_permission(
        &db,
        Some("viewer-user"),
        PROJECT,
        Some("env-prod"),
        &[ProjectPermission::Read],
    )
    .unwrap();
    assert_eq!(in_prod, ProjectPermission::Admin);

    // Every other environment falls back to the viewer-derived baseline.
    let in_dev = access::require_project_permission(
        &db,
        Some("viewer-user"),
        PROJECT,
        Some("env-dev"),
        &[ProjectPermission::Read],
    )
    .unwrap();
    assert_eq!(in_dev, ProjectPermission::Read);
}

#[test]
fn test_environment_override_beats_project_wide_row() {
    let mut db = support::db_with_project();
    support::seed_member(&mut db, TEAM, "viewer-user", TeamRole::Viewer);
    support::seed_override(&db, PROJECT, "viewer-user", None, "write");
    support::seed_override(&db, PROJECT, "viewer-user", Some("env-prod"), "admin");

    let in_prod = access::require_project_permission(
        &db,
        Some("viewer-user"),
        PROJECT,
        Some("env-prod"),
        &[ProjectPermission::Read],
    )
    .unwrap();
    assert_eq!(in_prod, ProjectPermission::Admin);

    let elsewhere = access::require_project_permission(
        &db,
        Some("viewer-user"),
        PROJECT,
        Some("env-dev"),
        &[ProjectPermission::Read],
    )
    .unwrap();
    assert_eq!(elsewhere, ProjectPermission::Write);
}

#[test]
fn test_permission_gate_uses_weakest_allowed() {
    let mut db = support::db_with_project();
    support::seed_member(&mut db, TEAM, "member-user", TeamRole::Member);

    // Allowed {admin, write}: minimum is write, which a member holds.
    access::require_project_permission(
        &db,
        Some("member-user"),
        PROJECT,
        None,
        &[ProjectPermission::Admin, ProjectPermission::Write],
    )
    .unwrap();

    let err = access::require_project_permission(
        &db,
        Some("member-user"),
        PROJECT,
        None,
        &[ProjectPermission::Admin],
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);
}
