//! 仪表盘汇总服务

use crate::{
    error::AppError,
    models::{
        asset::AssetFilter,
        dashboard::*,
        filter::{DateRange, RecordFilter},
        user::User,
    },
    repository::{
        AssetRepository, AssignmentRepository, ExpenditureRepository, PurchaseRepository,
        TransferRepository,
    },
    services::permission_service::PermissionService,
};
use sqlx::PgPool;
use uuid::Uuid;

pub struct DashboardService {
    db: PgPool,
    permissions: PermissionService,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl DashboardService {
    pub fn new(db: PgPool, permissions: PermissionService) -> Self {
        Self { db, permissions }
    }

    /// 汇总概览：资产统计、按类型分组与最近记录
    pub async fn overview(&self, user: &User, query: DashboardQuery) -> Result<DashboardOverview, AppError> {
        let range = DateRange::parse(query.start_date.as_deref(), query.end_date.as_deref())
            .map_err(AppError::Validation)?;
        let base = self.permissions.effective_base(user, non_empty(query.base))?;
        let asset_type = non_empty(query.asset_type);

        let asset_repo = AssetRepository::new(self.db.clone());
        let assets = asset_repo
            .list_all(&AssetFilter {
                base: base.clone(),
                asset_type: asset_type.clone(),
                created_from: range.start,
                created_to: range.end,
            })
            .await?;
        let rollup = AssetRollup::from_assets(&assets);

        let recent = RecordFilter::recent(base.clone(), asset_type.clone(), range, RECENT_LIMIT);
        let transfer_repo = TransferRepository::new(self.db.clone());
        let purchase_repo = PurchaseRepository::new(self.db.clone());
        let assignment_repo = AssignmentRepository::new(self.db.clone());
        let expenditure_repo = ExpenditureRepository::new(self.db.clone());

        let (recent_transfers, recent_purchases, recent_assignments, recent_expenditures) = tokio::try_join!(
            transfer_repo.list(&recent),
            purchase_repo.list(&recent),
            assignment_repo.list(&recent),
            expenditure_repo.list(&recent),
        )?;

        tracing::debug!(
            user_id = %user.id,
            base = ?base,
            assets = rollup.summary.total_assets,
            "Dashboard overview computed"
        );

        Ok(DashboardOverview {
            summary: rollup.summary,
            assets_by_type: rollup.assets_by_type,
            recent_transfers,
            recent_purchases,
            recent_assignments,
            recent_expenditures,
            filters: AppliedFilters::new(base, asset_type, range),
        })
    }

    /// 单个资产详情及其最近流水
    pub async fn asset_detail(&self, user: &User, asset_id: Uuid) -> Result<AssetDetail, AppError> {
        let asset_repo = AssetRepository::new(self.db.clone());
        let asset = asset_repo
            .get(asset_id)
            .await?
            .ok_or_else(|| AppError::not_found("Asset"))?;
        self.permissions.ensure_base_access(user, &asset.base)?;

        let history = RecordFilter::for_asset(asset_id, ASSET_HISTORY_LIMIT);
        let transfer_repo = TransferRepository::new(self.db.clone());
        let purchase_repo = PurchaseRepository::new(self.db.clone());
        let assignment_repo = AssignmentRepository::new(self.db.clone());
        let expenditure_repo = ExpenditureRepository::new(self.db.clone());

        let (transfers, purchases, assignments, expenditures) = tokio::try_join!(
            transfer_repo.list(&history),
            purchase_repo.list(&history),
            assignment_repo.list(&history),
            expenditure_repo.list(&history),
        )?;

        Ok(AssetDetail {
            asset,
            transfers,
            purchases,
            assignments,
            expenditures,
        })
    }

    /// 单个基地的汇总
    pub async fn base_dashboard(&self, user: &User, base: &str) -> Result<BaseDashboard, AppError> {
        self.permissions.ensure_base_access(user, base)?;

        let asset_repo = AssetRepository::new(self.db.clone());
        let assets = asset_repo
            .list_all(&AssetFilter {
                base: Some(base.to_string()),
                ..Default::default()
            })
            .await?;
        let rollup = AssetRollup::from_assets(&assets);

        Ok(BaseDashboard {
            base: base.to_string(),
            summary: rollup.summary,
            assets_by_type: rollup.assets_by_type,
        })
    }
}
