//! Dashboard aggregation models
//!
//! The rollup is a pure function of the matched asset set so it can be
//! exercised without a database.

use super::{
    asset::Asset, assignment::Assignment, expenditure::Expenditure, filter::DateRange,
    purchase::Purchase, transfer::Transfer,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of records in each "recent" list on the overview
pub const RECENT_LIMIT: i64 = 5;
/// Number of records per ledger on the asset detail view
pub const ASSET_HISTORY_LIMIT: i64 = 10;

/// `GET /api/dashboard` query parameters
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardQuery {
    pub base: Option<String>,
    pub asset_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Totals across a set of assets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_assets: i64,
    pub total_opening_balance: i64,
    pub total_closing_balance: i64,
    pub total_purchases: i64,
    pub total_transfer_in: i64,
    pub total_transfer_out: i64,
    pub total_assigned: i64,
    pub total_expended: i64,
    pub total_available: i64,
}

/// Totals for one asset type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeSummary {
    pub count: i64,
    pub opening_balance: i64,
    pub closing_balance: i64,
    pub purchases: i64,
    pub transfer_in: i64,
    pub transfer_out: i64,
    pub assigned: i64,
    pub expended: i64,
    pub available: i64,
}

// 汇总值在极端输入下饱和到 i64::MAX，不会 panic
impl DashboardSummary {
    fn add(&mut self, asset: &Asset) {
        self.total_assets = self.total_assets.saturating_add(1);
        self.total_opening_balance = self.total_opening_balance
            .saturating_add(asset.opening_balance);
        self.total_closing_balance = self.total_closing_balance
            .saturating_add(asset.closing_balance);
        self.total_purchases = self.total_purchases.saturating_add(asset.purchases);
        self.total_transfer_in = self.total_transfer_in.saturating_add(asset.transfer_in);
        self.total_transfer_out = self.total_transfer_out.saturating_add(asset.transfer_out);
        self.total_assigned = self.total_assigned.saturating_add(asset.assigned);
        self.total_expended = self.total_expended.saturating_add(asset.expended);
        self.total_available = self.total_available.saturating_add(asset.available);
    }
}

impl TypeSummary {
    fn add(&mut self, asset: &Asset) {
        self.count = self.count.saturating_add(1);
        self.opening_balance = self.opening_balance.saturating_add(asset.opening_balance);
        self.closing_balance = self.closing_balance.saturating_add(asset.closing_balance);
        self.purchases = self.purchases.saturating_add(asset.purchases);
        self.transfer_in = self.transfer_in.saturating_add(asset.transfer_in);
        self.transfer_out = self.transfer_out.saturating_add(asset.transfer_out);
        self.assigned = self.assigned.saturating_add(asset.assigned);
        self.expended = self.expended.saturating_add(asset.expended);
        self.available = self.available.saturating_add(asset.available);
    }
}

/// Summary plus per-type groups
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRollup {
    pub summary: DashboardSummary,
    pub assets_by_type: BTreeMap<String, TypeSummary>,
}

impl AssetRollup {
    /// Single pass over the assets; every asset lands in exactly one group
    pub fn from_assets(assets: &[Asset]) -> Self {
        let mut rollup = AssetRollup::default();
        for asset in assets {
            rollup.summary.add(asset);
            rollup
                .assets_by_type
                .entry(asset.asset_type.clone())
                .or_default()
                .add(asset);
        }
        rollup
    }
}

/// Filter actually applied, after base scoping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedFilters {
    pub base: Option<String>,
    pub asset_type: Option<String>,
    pub start_date: Option<chrono::DateTime<chrono::Utc>>,
    pub end_date: Option<chrono::DateTime<chrono::Utc>>,
}

impl AppliedFilters {
    pub fn new(base: Option<String>, asset_type: Option<String>, range: DateRange) -> Self {
        Self {
            base,
            asset_type,
            start_date: range.start,
            end_date: range.end,
        }
    }
}

/// `GET /api/dashboard` response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    pub summary: DashboardSummary,
    pub assets_by_type: BTreeMap<String, TypeSummary>,
    pub recent_transfers: Vec<Transfer>,
    pub recent_purchases: Vec<Purchase>,
    pub recent_assignments: Vec<Assignment>,
    pub recent_expenditures: Vec<Expenditure>,
    pub filters: AppliedFilters,
}

/// `GET /api/dashboard/asset/{id}` response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDetail {
    pub asset: Asset,
    pub transfers: Vec<Transfer>,
    pub purchases: Vec<Purchase>,
    pub assignments: Vec<Assignment>,
    pub expenditures: Vec<Expenditure>,
}

/// `GET /api/dashboard/base/{base}` response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseDashboard {
    pub base: String,
    pub summary: DashboardSummary,
    pub assets_by_type: BTreeMap<String, TypeSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_rollup_is_zero() {
        let rollup = AssetRollup::from_assets(&[]);
        assert_eq!(rollup.summary, DashboardSummary::default());
        assert!(rollup.assets_by_type.is_empty());
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let value = serde_json::to_value(DashboardSummary::default()).unwrap();
        assert_eq!(value["totalAssets"], 0);
        assert_eq!(value["totalTransferIn"], 0);
        assert!(value.get("total_assets").is_none());
    }

    #[test]
    fn test_rollup_saturates_instead_of_overflowing() {
        let now = chrono::Utc::now();
        let asset = Asset {
            id: uuid::Uuid::new_v4(),
            name: "Fuel".to_string(),
            asset_type: "Consumable".to_string(),
            base: "Base-A".to_string(),
            opening_balance: i64::MAX,
            closing_balance: i64::MAX,
            purchases: 0,
            transfer_in: 0,
            transfer_out: 0,
            assigned: 0,
            expended: 0,
            available: i64::MAX,
            created_by: None,
            created_at: now,
            updated_at: now,
        };

        let rollup = AssetRollup::from_assets(&[asset.clone(), asset]);
        assert_eq!(rollup.summary.total_assets, 2);
        assert_eq!(rollup.summary.total_closing_balance, i64::MAX);
        assert_eq!(rollup.summary.total_available, i64::MAX);
        let group = &rollup.assets_by_type["Consumable"];
        assert_eq!(group.count, 2);
        assert_eq!(group.opening_balance, i64::MAX);
    }
}
