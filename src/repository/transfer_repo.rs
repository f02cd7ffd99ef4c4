//! Transfer repository (调拨数据访问)

use super::ledger::{bind_filter, TRANSFERS};
use crate::{
    error::AppError,
    models::{filter::RecordFilter, transfer::*},
};
use sqlx::PgPool;
use uuid::Uuid;

pub struct TransferRepository {
    db: PgPool,
}

impl TransferRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 按过滤条件列出调拨记录，最新优先
    pub async fn list(&self, filter: &RecordFilter) -> Result<Vec<Transfer>, AppError> {
        let query = TRANSFERS.select_sql(filter);
        let transfers = bind_filter(sqlx::query_as::<_, Transfer>(&query), filter)
            .fetch_all(&self.db)
            .await?;

        Ok(transfers)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Transfer>, AppError> {
        let transfer = sqlx::query_as::<_, Transfer>("SELECT * FROM transfers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(transfer)
    }

    /// 创建调拨
    pub async fn create(&self, req: &CreateTransferRequest, transferred_by: Uuid) -> Result<Transfer, AppError> {
        let transfer = sqlx::query_as::<_, Transfer>(
            r#"
            INSERT INTO transfers (asset_id, from_base, to_base, quantity, transferred_by, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(req.asset_id)
        .bind(&req.from_base)
        .bind(&req.to_base)
        .bind(req.quantity)
        .bind(transferred_by)
        .bind(&req.notes)
        .fetch_one(&self.db)
        .await?;

        Ok(transfer)
    }

    /// 更新状态；审批时记录审批人
    ///
    /// 仅当当前状态仍为 `from` 时生效，否则返回 `None`
    pub async fn update_status(
        &self,
        id: Uuid,
        from: TransferStatus,
        status: TransferStatus,
        approved_by: Option<Uuid>,
    ) -> Result<Option<Transfer>, AppError> {
        let transfer = sqlx::query_as::<_, Transfer>(
            r#"
            UPDATE transfers
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

        Ok(transfer)
    }
}
