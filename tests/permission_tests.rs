//! 角色权限与基地范围测试

use mams_service::{
    error::AppError,
    models::user::Role,
    services::permission_service::{is_allowed, Action, PermissionService, Resource},
};

mod common;
use common::sample_user;

// ==================== 权限表测试 ====================

#[test]
fn test_admin_has_full_access() {
    for resource in [
        Resource::Asset,
        Resource::Transfer,
        Resource::Purchase,
        Resource::Assignment,
        Resource::Expenditure,
        Resource::User,
    ] {
        for action in [Action::Read, Action::Create, Action::Update] {
            assert!(is_allowed(Role::Admin, resource, action), "{:?} {:?}", resource, action);
        }
    }
    assert!(is_allowed(Role::Admin, Resource::ActivityLog, Action::Read));
}

#[test]
fn test_user_management_is_admin_only() {
    for role in [Role::BaseCommander, Role::LogisticsOfficer] {
        assert!(!is_allowed(role, Resource::User, Action::Read));
        assert!(!is_allowed(role, Resource::User, Action::Create));
        assert!(!is_allowed(role, Resource::ActivityLog, Action::Read));
    }
}

#[test]
fn test_base_commander_permissions() {
    let role = Role::BaseCommander;
    assert!(is_allowed(role, Resource::Dashboard, Action::Read));
    assert!(is_allowed(role, Resource::Assignment, Action::Create));
    assert!(is_allowed(role, Resource::Assignment, Action::Update));
    assert!(is_allowed(role, Resource::Expenditure, Action::Create));
    assert!(!is_allowed(role, Resource::Expenditure, Action::Update));
}

#[test]
fn test_logistics_officer_permissions() {
    let role = Role::LogisticsOfficer;
    assert!(is_allowed(role, Resource::Purchase, Action::Create));
    assert!(is_allowed(role, Resource::Transfer, Action::Create));
    assert!(!is_allowed(role, Resource::Transfer, Action::Update));
    assert!(!is_allowed(role, Resource::Assignment, Action::Create));
    assert!(!is_allowed(role, Resource::Expenditure, Action::Create));
    assert!(is_allowed(role, Resource::Expenditure, Action::Read));
}

#[test]
fn test_require_role() {
    let service = PermissionService::default();
    let commander = sample_user(Role::BaseCommander, Some("Base-A"));

    assert!(service.require_role(&commander, &[Role::Admin, Role::BaseCommander]).is_ok());
    assert!(matches!(
        service.require_role(&commander, &[Role::Admin]),
        Err(AppError::Forbidden)
    ));
}

#[test]
fn test_authorize_maps_to_forbidden() {
    let service = PermissionService::default();
    let officer = sample_user(Role::LogisticsOfficer, None);

    assert!(service.authorize(&officer, Resource::Asset, Action::Read).is_ok());
    assert!(matches!(
        service.authorize(&officer, Resource::User, Action::Read),
        Err(AppError::Forbidden)
    ));
}

// ==================== 基地范围测试 ====================

#[test]
fn test_base_commander_is_pinned_to_assigned_base() {
    let service = PermissionService::default();
    let commander = sample_user(Role::BaseCommander, Some("Base-A"));

    assert!(service.is_base_scoped(&commander));
    assert_eq!(
        service.effective_base(&commander, Some("Base-B".to_string())).unwrap(),
        Some("Base-A".to_string())
    );
    assert_eq!(
        service.effective_base(&commander, None).unwrap(),
        Some("Base-A".to_string())
    );

    assert!(service.ensure_base_access(&commander, "Base-A").is_ok());
    assert!(matches!(
        service.ensure_base_access(&commander, "Base-B"),
        Err(AppError::Forbidden)
    ));
}

#[test]
fn test_base_commander_without_base_is_forbidden() {
    let service = PermissionService::default();
    let commander = sample_user(Role::BaseCommander, None);

    assert!(matches!(
        service.effective_base(&commander, Some("Base-A".to_string())),
        Err(AppError::Forbidden)
    ));
    assert!(service.ensure_base_access(&commander, "Base-A").is_err());
}

#[test]
fn test_admin_can_request_any_base() {
    let service = PermissionService::default();
    let admin = sample_user(Role::Admin, None);

    assert!(!service.is_base_scoped(&admin));
    assert_eq!(
        service.effective_base(&admin, Some("Base-B".to_string())).unwrap(),
        Some("Base-B".to_string())
    );
    // 空字符串视为未过滤
    assert_eq!(service.effective_base(&admin, Some("  ".to_string())).unwrap(), None);
    assert!(service.ensure_base_access(&admin, "Anywhere").is_ok());
}

#[test]
fn test_logistics_officer_scoping_is_configurable() {
    let officer = sample_user(Role::LogisticsOfficer, Some("Base-A"));

    let cross_base = PermissionService::new(false);
    assert!(!cross_base.is_base_scoped(&officer));
    assert!(cross_base.ensure_base_access(&officer, "Base-B").is_ok());

    let scoped = PermissionService::new(true);
    assert!(scoped.is_base_scoped(&officer));
    assert_eq!(
        scoped.effective_base(&officer, Some("Base-B".to_string())).unwrap(),
        Some("Base-A".to_string())
    );
    assert!(scoped.ensure_base_access(&officer, "Base-B").is_err());
}
