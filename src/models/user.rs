//! User domain models

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("valid username pattern"));

/// Role of a user account
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
pub enum Role {
    Admin,
    BaseCommander,
    LogisticsOfficer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::BaseCommander => "BaseCommander",
            Role::LogisticsOfficer => "LogisticsOfficer",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
    pub assigned_base: Option<String>,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Register (create) user request, Admin only
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 64), regex(path = *USERNAME_RE))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    pub password: String,
    #[validate(length(min = 1, max = 128))]
    pub full_name: String,
    pub role: Role,
    #[validate(length(min = 1, max = 128))]
    pub assigned_base: Option<String>,
}

impl RegisterRequest {
    /// A base commander is meaningless without a base
    pub fn check_role_base(&self) -> Result<(), String> {
        check_role_base(self.role, self.assigned_base.as_deref())
    }
}

/// Admin update of a user account
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 128))]
    pub full_name: Option<String>,
    pub role: Option<Role>,
    #[validate(length(min = 1, max = 128))]
    pub assigned_base: Option<String>,
    pub is_active: Option<bool>,
}

/// Change password request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

pub fn check_role_base(role: Role, assigned_base: Option<&str>) -> Result<(), String> {
    if role == Role::BaseCommander && assigned_base.map_or(true, |b| b.trim().is_empty()) {
        return Err("assignedBase is required for a BaseCommander".to_string());
    }
    Ok(())
}

/// User response (without sensitive data)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub assigned_base: Option<String>,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
            assigned_base: user.assigned_base,
            is_active: user.is_active,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_with_pascal_case_names() {
        assert_eq!(serde_json::to_string(&Role::BaseCommander).unwrap(), "\"BaseCommander\"");
        let role: Role = serde_json::from_str("\"LogisticsOfficer\"").unwrap();
        assert_eq!(role, Role::LogisticsOfficer);
        assert!(serde_json::from_str::<Role>("\"Janitor\"").is_err());
    }

    #[test]
    fn test_base_commander_requires_base() {
        assert!(check_role_base(Role::BaseCommander, None).is_err());
        assert!(check_role_base(Role::BaseCommander, Some("  ")).is_err());
        assert!(check_role_base(Role::BaseCommander, Some("Base-A")).is_ok());
        assert!(check_role_base(Role::Admin, None).is_ok());
        assert!(check_role_base(Role::LogisticsOfficer, None).is_ok());
    }

    #[test]
    fn test_register_request_validation() {
        let request: RegisterRequest = serde_json::from_value(serde_json::json!({
            "username": "cmdr.alpha",
            "email": "alpha@example.mil",
            "password": "Secret123",
            "fullName": "Alpha Commander",
            "role": "BaseCommander",
            "assignedBase": "Base-A"
        }))
        .unwrap();
        assert!(request.validate().is_ok());
        assert!(request.check_role_base().is_ok());

        let bad: RegisterRequest = serde_json::from_value(serde_json::json!({
            "username": "no spaces allowed",
            "email": "not-an-email",
            "password": "Secret123",
            "fullName": "X",
            "role": "Admin"
        }))
        .unwrap();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_user_response_hides_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            username: "admin".to_string(),
            email: "admin@example.mil".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            full_name: "Admin".to_string(),
            role: Role::Admin,
            assigned_base: None,
            is_active: true,
            last_login_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let raw = serde_json::to_string(&user).unwrap();
        assert!(!raw.contains("argon2"));

        let response = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert_eq!(response["role"], "Admin");
        assert!(response.get("passwordHash").is_none());
    }
}
