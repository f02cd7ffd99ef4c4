//! Purchase domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// 采购状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "purchase_status", rename_all = "snake_case")]
pub enum PurchaseStatus {
    Pending,
    Approved,
    Delivered,
    Cancelled,
}

impl PurchaseStatus {
    pub fn can_transition_to(&self, next: PurchaseStatus) -> bool {
        use PurchaseStatus::*;
        matches!(
            (*self, next),
            (Pending, Approved) | (Pending, Cancelled) | (Approved, Delivered) | (Approved, Cancelled)
        )
    }

    pub fn marks_approval(&self) -> bool {
        matches!(self, PurchaseStatus::Approved)
    }
}

/// Procurement of asset quantity for a base
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub base: String,
    pub quantity: i64,
    pub status: PurchaseStatus,
    pub supplier: Option<String>,
    pub purchased_by: Uuid,
    pub approved_by: Option<Uuid>,
    pub purchase_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create purchase request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePurchaseRequest {
    pub asset_id: Uuid,
    #[validate(length(min = 1, max = 128))]
    pub base: String,
    #[validate(range(min = 1))]
    pub quantity: i64,
    #[validate(length(max = 128))]
    pub supplier: Option<String>,
    /// Defaults to now
    pub purchase_date: Option<DateTime<Utc>>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePurchaseStatusRequest {
    pub status: PurchaseStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purchase_status_transitions() {
        assert!(PurchaseStatus::Pending.can_transition_to(PurchaseStatus::Approved));
        assert!(PurchaseStatus::Approved.can_transition_to(PurchaseStatus::Delivered));
        assert!(!PurchaseStatus::Delivered.can_transition_to(PurchaseStatus::Cancelled));
        assert!(!PurchaseStatus::Pending.can_transition_to(PurchaseStatus::Delivered));
    }

    #[test]
    fn test_quantity_must_be_positive() {
        let request = CreatePurchaseRequest {
            asset_id: Uuid::new_v4(),
            base: "Base-A".to_string(),
            quantity: 0,
            supplier: None,
            purchase_date: None,
            notes: None,
        };
        assert!(request.validate().is_err());
    }
}
