//! Transfer domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// 调拨状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "transfer_status", rename_all = "snake_case")]
pub enum TransferStatus {
    Pending,
    Approved,
    InTransit,
    Completed,
    Cancelled,
}

impl TransferStatus {
    /// Completed and cancelled transfers are final
    pub fn can_transition_to(&self, next: TransferStatus) -> bool {
        use TransferStatus::*;
        matches!(
            (*self, next),
            (Pending, Approved)
                | (Pending, Cancelled)
                | (Approved, InTransit)
                | (Approved, Completed)
                | (Approved, Cancelled)
                | (InTransit, Completed)
        )
    }

    /// Approval records who signed off
    pub fn marks_approval(&self) -> bool {
        matches!(self, TransferStatus::Approved)
    }
}

/// Movement of asset quantity from one base to another
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub from_base: String,
    pub to_base: String,
    pub quantity: i64,
    pub status: TransferStatus,
    pub transferred_by: Uuid,
    pub approved_by: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create transfer request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransferRequest {
    pub asset_id: Uuid,
    #[validate(length(min = 1, max = 128))]
    pub from_base: String,
    #[validate(length(min = 1, max = 128))]
    pub to_base: String,
    #[validate(range(min = 1))]
    pub quantity: i64,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl CreateTransferRequest {
    pub fn check_bases(&self) -> Result<(), String> {
        if self.from_base == self.to_base {
            return Err("fromBase and toBase must differ".to_string());
        }
        Ok(())
    }
}

/// Status change request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransferStatusRequest {
    pub status: TransferStatus,
}
