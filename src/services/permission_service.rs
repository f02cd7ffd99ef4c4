//! 权限检查服务
//!
//! Role permissions live in one declarative table; base scoping is layered on
//! top for roles that are tied to a single base.

use crate::{
    error::AppError,
    models::user::{Role, User},
};

/// Protected resource kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Dashboard,
    Asset,
    Transfer,
    Purchase,
    Assignment,
    Expenditure,
    User,
    ActivityLog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
}

const ALL: &[Action] = &[Action::Read, Action::Create, Action::Update];
const READ: &[Action] = &[Action::Read];
const READ_CREATE: &[Action] = &[Action::Read, Action::Create];
const READ_CREATE_UPDATE: &[Action] = &[Action::Read, Action::Create, Action::Update];
const NONE: &[Action] = &[];

/// One row per resource: allowed actions for Admin, BaseCommander, LogisticsOfficer
struct PermissionRow {
    resource: Resource,
    admin: &'static [Action],
    base_commander: &'static [Action],
    logistics_officer: &'static [Action],
}

const PERMISSIONS: &[PermissionRow] = &[
    PermissionRow {
        resource: Resource::Dashboard,
        admin: READ,
        base_commander: READ,
        logistics_officer: READ,
    },
    PermissionRow {
        resource: Resource::Asset,
        admin: ALL,
        base_commander: READ_CREATE_UPDATE,
        logistics_officer: READ_CREATE_UPDATE,
    },
    PermissionRow {
        resource: Resource::Transfer,
        admin: ALL,
        base_commander: READ_CREATE_UPDATE,
        logistics_officer: READ_CREATE,
    },
    PermissionRow {
        resource: Resource::Purchase,
        admin: ALL,
        base_commander: READ_CREATE_UPDATE,
        logistics_officer: READ_CREATE,
    },
    PermissionRow {
        resource: Resource::Assignment,
        admin: ALL,
        base_commander: READ_CREATE_UPDATE,
        logistics_officer: READ,
    },
    PermissionRow {
        resource: Resource::Expenditure,
        admin: ALL,
        base_commander: READ_CREATE,
        logistics_officer: READ,
    },
    PermissionRow {
        resource: Resource::User,
        admin: ALL,
        base_commander: NONE,
        logistics_officer: NONE,
    },
    PermissionRow {
        resource: Resource::ActivityLog,
        admin: READ,
        base_commander: NONE,
        logistics_officer: NONE,
    },
];

/// Whether the permission table grants `action` on `resource` to `role`
pub fn is_allowed(role: Role, resource: Resource, action: Action) -> bool {
    PERMISSIONS
        .iter()
        .find(|row| row.resource == resource)
        .map(|row| match role {
            Role::Admin => row.admin,
            Role::BaseCommander => row.base_commander,
            Role::LogisticsOfficer => row.logistics_officer,
        })
        .is_some_and(|actions| actions.contains(&action))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PermissionService {
    logistics_officer_base_scoped: bool,
}

impl PermissionService {
    pub fn new(logistics_officer_base_scoped: bool) -> Self {
        Self {
            logistics_officer_base_scoped,
        }
    }

    /// 检查角色白名单
    pub fn require_role(&self, user: &User, allowed: &[Role]) -> Result<(), AppError> {
        if allowed.contains(&user.role) {
            return Ok(());
        }

        tracing::warn!(user_id = %user.id, role = %user.role, "Role not allowed");
        Err(AppError::Forbidden)
    }

    /// 根据权限表检查操作权限
    pub fn authorize(&self, user: &User, resource: Resource, action: Action) -> Result<(), AppError> {
        if is_allowed(user.role, resource, action) {
            return Ok(());
        }

        tracing::warn!(
            user_id = %user.id,
            role = %user.role,
            resource = ?resource,
            action = ?action,
            "Permission denied"
        );
        Err(AppError::Forbidden)
    }

    /// Whether this user only ever sees their assigned base
    pub fn is_base_scoped(&self, user: &User) -> bool {
        match user.role {
            Role::Admin => false,
            Role::BaseCommander => true,
            Role::LogisticsOfficer => self.logistics_officer_base_scoped,
        }
    }

    /// Base a query should be restricted to. Scoped users are pinned to their
    /// assigned base whatever they asked for.
    pub fn effective_base(&self, user: &User, requested: Option<String>) -> Result<Option<String>, AppError> {
        if !self.is_base_scoped(user) {
            return Ok(requested.filter(|b| !b.trim().is_empty()));
        }

        match assigned_base(user) {
            Some(base) => Ok(Some(base.to_string())),
            None => {
                tracing::warn!(user_id = %user.id, role = %user.role, "Base-scoped user has no assigned base");
                Err(AppError::Forbidden)
            }
        }
    }

    /// 检查用户能否访问指定基地
    pub fn ensure_base_access(&self, user: &User, base: &str) -> Result<(), AppError> {
        if !self.is_base_scoped(user) {
            return Ok(());
        }

        if assigned_base(user) == Some(base) {
            return Ok(());
        }

        tracing::warn!(user_id = %user.id, base = %base, "Base access denied");
        Err(AppError::Forbidden)
    }
}

fn assigned_base(user: &User) -> Option<&str> {
    user.assigned_base.as_deref().filter(|b| !b.trim().is_empty())
}
