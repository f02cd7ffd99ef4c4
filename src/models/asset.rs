//! Asset domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// One kind of equipment held at a base, with its quantity balances
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: Uuid,
    pub name: String,
    pub asset_type: String,
    pub base: String,
    pub opening_balance: i64,
    pub closing_balance: i64,
    pub purchases: i64,
    pub transfer_in: i64,
    pub transfer_out: i64,
    pub assigned: i64,
    pub expended: i64,
    pub available: i64,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The independent balance inputs of an asset.
///
/// `closing_balance` and `available` are always derived from these:
/// closing = opening + purchases + transfer_in - transfer_out - expended,
/// available = closing - assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AssetBalances {
    pub opening_balance: i64,
    pub purchases: i64,
    pub transfer_in: i64,
    pub transfer_out: i64,
    pub assigned: i64,
    pub expended: i64,
}

/// Derived closing and available quantities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedBalances {
    pub closing_balance: i64,
    pub available: i64,
}

impl AssetBalances {
    pub fn derive(&self) -> Result<DerivedBalances, String> {
        let inputs = [
            self.opening_balance,
            self.purchases,
            self.transfer_in,
            self.transfer_out,
            self.assigned,
            self.expended,
        ];
        if inputs.iter().any(|v| *v < 0) {
            return Err("Balances must be non-negative".to_string());
        }

        let closing_balance = self
            .opening_balance
            .checked_add(self.purchases)
            .and_then(|v| v.checked_add(self.transfer_in))
            .and_then(|v| v.checked_sub(self.transfer_out))
            .and_then(|v| v.checked_sub(self.expended))
            .ok_or_else(|| "Balance out of range".to_string())?;
        if closing_balance < 0 {
            return Err("Outgoing transfers and expenditures exceed the stock on hand".to_string());
        }

        // 输入非负且 closing 非负，这里不会溢出
        let available = closing_balance - self.assigned;
        if available < 0 {
            return Err("Assigned quantity exceeds the closing balance".to_string());
        }

        Ok(DerivedBalances {
            closing_balance,
            available,
        })
    }
}

impl From<&Asset> for AssetBalances {
    fn from(asset: &Asset) -> Self {
        Self {
            opening_balance: asset.opening_balance,
            purchases: asset.purchases,
            transfer_in: asset.transfer_in,
            transfer_out: asset.transfer_out,
            assigned: asset.assigned,
            expended: asset.expended,
        }
    }
}

/// Create asset request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssetRequest {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[validate(length(min = 1, max = 64))]
    pub asset_type: String,
    #[validate(length(min = 1, max = 128))]
    pub base: String,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub opening_balance: i64,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub purchases: i64,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub transfer_in: i64,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub transfer_out: i64,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub assigned: i64,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub expended: i64,
}

impl CreateAssetRequest {
    pub fn balances(&self) -> AssetBalances {
        AssetBalances {
            opening_balance: self.opening_balance,
            purchases: self.purchases,
            transfer_in: self.transfer_in,
            transfer_out: self.transfer_out,
            assigned: self.assigned,
            expended: self.expended,
        }
    }
}

/// Update asset request, absent fields keep their current value
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssetRequest {
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub asset_type: Option<String>,
    #[validate(length(min = 1, max = 128))]
    pub base: Option<String>,
    #[validate(range(min = 0))]
    pub opening_balance: Option<i64>,
    #[validate(range(min = 0))]
    pub purchases: Option<i64>,
    #[validate(range(min = 0))]
    pub transfer_in: Option<i64>,
    #[validate(range(min = 0))]
    pub transfer_out: Option<i64>,
    #[validate(range(min = 0))]
    pub assigned: Option<i64>,
    #[validate(range(min = 0))]
    pub expended: Option<i64>,
}

impl UpdateAssetRequest {
    /// Applies the request onto the current asset and returns the merged row
    pub fn apply_to(&self, current: &Asset) -> Result<Asset, String> {
        let balances = AssetBalances {
            opening_balance: self.opening_balance.unwrap_or(current.opening_balance),
            purchases: self.purchases.unwrap_or(current.purchases),
            transfer_in: self.transfer_in.unwrap_or(current.transfer_in),
            transfer_out: self.transfer_out.unwrap_or(current.transfer_out),
            assigned: self.assigned.unwrap_or(current.assigned),
            expended: self.expended.unwrap_or(current.expended),
        };
        let derived = balances.derive()?;

        Ok(Asset {
            name: self.name.clone().unwrap_or_else(|| current.name.clone()),
            asset_type: self
                .asset_type
                .clone()
                .unwrap_or_else(|| current.asset_type.clone()),
            base: self.base.clone().unwrap_or_else(|| current.base.clone()),
            opening_balance: balances.opening_balance,
            closing_balance: derived.closing_balance,
            purchases: balances.purchases,
            transfer_in: balances.transfer_in,
            transfer_out: balances.transfer_out,
            assigned: balances.assigned,
            expended: balances.expended,
            available: derived.available,
            ..current.clone()
        })
    }
}

/// Asset list filters
#[derive(Debug, Clone, Default)]
pub struct AssetFilter {
    pub base: Option<String>,
    pub asset_type: Option<String>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_asset() -> Asset {
        Asset {
            id: Uuid::new_v4(),
            name: "M4 Carbine".to_string(),
            asset_type: "Weapon".to_string(),
            base: "Base-A".to_string(),
            opening_balance: 100,
            closing_balance: 110,
            purchases: 20,
            transfer_in: 5,
            transfer_out: 10,
            assigned: 30,
            expended: 5,
            available: 80,
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_derive_balances() {
        let derived = AssetBalances::from(&sample_asset()).derive().unwrap();
        assert_eq!(derived.closing_balance, 110);
        assert_eq!(derived.available, 80);
    }

    #[test]
    fn test_derive_rejects_overdrawn_stock() {
        let balances = AssetBalances {
            opening_balance: 5,
            transfer_out: 10,
            ..Default::default()
        };
        assert!(balances.derive().is_err());

        let over_assigned = AssetBalances {
            opening_balance: 5,
            assigned: 6,
            ..Default::default()
        };
        assert!(over_assigned.derive().is_err());

        let negative = AssetBalances {
            purchases: -1,
            ..Default::default()
        };
        assert!(negative.derive().is_err());
    }

    #[test]
    fn test_derive_rejects_out_of_range_totals() {
        let balances = AssetBalances {
            opening_balance: i64::MAX,
            purchases: 1,
            ..Default::default()
        };
        assert_eq!(balances.derive().unwrap_err(), "Balance out of range");

        let inbound = AssetBalances {
            opening_balance: i64::MAX - 1,
            transfer_in: 1,
            ..Default::default()
        };
        let derived = inbound.derive().unwrap();
        assert_eq!(derived.closing_balance, i64::MAX);
        assert_eq!(derived.available, i64::MAX);
    }

    #[test]
    fn test_update_recomputes_derived_fields() {
        let current = sample_asset();
        let update = UpdateAssetRequest {
            name: None,
            asset_type: None,
            base: None,
            opening_balance: None,
            purchases: Some(40),
            transfer_in: None,
            transfer_out: None,
            assigned: None,
            expended: None,
        };

        let merged = update.apply_to(&current).unwrap();
        assert_eq!(merged.purchases, 40);
        assert_eq!(merged.closing_balance, 130);
        assert_eq!(merged.available, 100);
        assert_eq!(merged.name, current.name);
        assert_eq!(merged.id, current.id);
    }

    #[test]
    fn test_asset_serializes_camel_case() {
        let value = serde_json::to_value(sample_asset()).unwrap();
        assert_eq!(value["assetType"], "Weapon");
        assert_eq!(value["closingBalance"], 110);
        assert_eq!(value["transferIn"], 5);
    }
}
