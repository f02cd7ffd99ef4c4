//! Assignment domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// 分配状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "assignment_status", rename_all = "snake_case")]
pub enum AssignmentStatus {
    Active,
    Returned,
    Lost,
}

impl AssignmentStatus {
    /// Only an active assignment can be closed
    pub fn can_transition_to(&self, next: AssignmentStatus) -> bool {
        matches!(
            (*self, next),
            (AssignmentStatus::Active, AssignmentStatus::Returned)
                | (AssignmentStatus::Active, AssignmentStatus::Lost)
        )
    }
}

/// Issue of asset quantity to personnel
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub base: String,
    pub quantity: i64,
    pub assigned_to: String,
    pub assigned_by: Uuid,
    pub status: AssignmentStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create assignment request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssignmentRequest {
    pub asset_id: Uuid,
    #[validate(length(min = 1, max = 128))]
    pub base: String,
    #[validate(range(min = 1))]
    pub quantity: i64,
    #[validate(length(min = 1, max = 128))]
    pub assigned_to: String,
    /// Defaults to now
    pub start_date: Option<DateTime<Utc>>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssignmentStatusRequest {
    pub status: AssignmentStatus,
}
