//! Activity log domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 用户操作类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActivityAction {
    Create,
    Update,
    Login,
    Logout,
    LogoutAll,
    FailedLogin,
    PasswordChange,
    Deactivate,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::Create => "Create",
            ActivityAction::Update => "Update",
            ActivityAction::Login => "Login",
            ActivityAction::Logout => "Logout",
            ActivityAction::LogoutAll => "LogoutAll",
            ActivityAction::FailedLogin => "FailedLogin",
            ActivityAction::PasswordChange => "PasswordChange",
            ActivityAction::Deactivate => "Deactivate",
        }
    }
}

impl std::fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource names used in activity entries
pub mod resource {
    pub const AUTH: &str = "Auth";
    pub const USER: &str = "User";
    pub const ASSET: &str = "Asset";
    pub const TRANSFER: &str = "Transfer";
    pub const PURCHASE: &str = "Purchase";
    pub const ASSIGNMENT: &str = "Assignment";
    pub const EXPENDITURE: &str = "Expenditure";
}

/// Activity log entry (append-only)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub username: Option<String>,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<Uuid>,
    pub details: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Entry to append
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub user_id: Option<Uuid>,
    pub username: Option<String>,
    pub action: ActivityAction,
    pub resource_type: &'static str,
    pub resource_id: Option<Uuid>,
    pub details: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl NewActivity {
    pub fn new(action: ActivityAction, resource_type: &'static str) -> Self {
        Self {
            user_id: None,
            username: None,
            action,
            resource_type,
            resource_id: None,
            details: None,
            ip_address: None,
            user_agent: None,
        }
    }

    pub fn actor(mut self, user_id: Uuid, username: &str) -> Self {
        self.user_id = Some(user_id);
        self.username = Some(username.to_string());
        self
    }

    pub fn resource(mut self, resource_id: Uuid) -> Self {
        self.resource_id = Some(resource_id);
        self
    }

    pub fn details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn client(mut self, client: &super::auth::ClientInfo) -> Self {
        self.ip_address = client.ip_address.clone();
        self.user_agent = client.user_agent.clone();
        self
    }
}

/// Activity log query parameters
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogQuery {
    pub user_id: Option<Uuid>,
    pub action: Option<ActivityAction>,
    pub resource_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Parsed activity log filters
#[derive(Debug, Clone, Default)]
pub struct ActivityLogFilters {
    pub user_id: Option<Uuid>,
    pub action: Option<ActivityAction>,
    pub resource_type: Option<String>,
    pub range: super::filter::DateRange,
}
