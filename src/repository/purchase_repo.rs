//! Purchase repository (采购数据访问)

use super::ledger::{bind_filter, PURCHASES};
use crate::{
    error::AppError,
    models::{filter::RecordFilter, purchase::*},
};
use sqlx::PgPool;
use uuid::Uuid;

pub struct PurchaseRepository {
    db: PgPool,
}

impl PurchaseRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list(&self, filter: &RecordFilter) -> Result<Vec<Purchase>, AppError> {
        let query = PURCHASES.select_sql(filter);
        let purchases = bind_filter(sqlx::query_as::<_, Purchase>(&query), filter)
            .fetch_all(&self.db)
            .await?;

        Ok(purchases)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Purchase>, AppError> {
        let purchase = sqlx::query_as::<_, Purchase>("SELECT * FROM purchases WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(purchase)
    }

    /// 创建采购记录，未指定采购日期时取当前时间
    pub async fn create(&self, req: &CreatePurchaseRequest, purchased_by: Uuid) -> Result<Purchase, AppError> {
        let purchase = sqlx::query_as::<_, Purchase>(
            r#"
            INSERT INTO purchases (asset_id, base, quantity, supplier, purchased_by, purchase_date, notes)
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, NOW()), $7)
            RETURNING *
            "#,
        )
        .bind(req.asset_id)
        .bind(&req.base)
        .bind(req.quantity)
        .bind(&req.supplier)
        .bind(purchased_by)
        .bind(req.purchase_date)
        .bind(&req.notes)
        .fetch_one(&self.db)
        .await?;

        Ok(purchase)
    }

    /// 仅当当前状态仍为 `from` 时更新
    pub async fn update_status(
        &self,
        id: Uuid,
        from: PurchaseStatus,
        status: PurchaseStatus,
        approved_by: Option<Uuid>,
    ) -> Result<Option<Purchase>, AppError> {
        let purchase = sqlx::query_as::<_, Purchase>(
            r#"
            UPDATE purchases
            SET status = $2, approved_by = COALESCE($3, approved_by), updated_at = NOW()
            WHERE id = $1 AND status = $4
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(approved_by)
        .bind(from)
        .fetch_optional(&self.db)
        .await?;

        Ok(purchase)
    }
}
