//! Expenditure domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Consumption or write-off of asset quantity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Expenditure {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub base: String,
    pub quantity: i64,
    pub reason: String,
    pub authorized_by: Uuid,
    pub expenditure_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Create expenditure request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenditureRequest {
    pub asset_id: Uuid,
    #[validate(length(min = 1, max = 128))]
    pub base: String,
    #[validate(range(min = 1))]
    pub quantity: i64,
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
    /// Defaults to now
    pub expenditure_date: Option<DateTime<Utc>>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}
