//! Assignment repository (分配数据访问)

use super::ledger::{bind_filter, ASSIGNMENTS};
use crate::{
    error::AppError,
    models::{assignment::*, filter::RecordFilter},
};
use sqlx::PgPool;
use uuid::Uuid;

pub struct AssignmentRepository {
    db: PgPool,
}

impl AssignmentRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list(&self, filter: &RecordFilter) -> Result<Vec<Assignment>, AppError> {
        let query = ASSIGNMENTS.select_sql(filter);
        let assignments = bind_filter(sqlx::query_as::<_, Assignment>(&query), filter)
            .fetch_all(&self.db)
            .await?;

        Ok(assignments)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Assignment>, AppError> {
        let assignment = sqlx::query_as::<_, Assignment>("SELECT * FROM assignments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(assignment)
    }

    pub async fn create(&self, req: &CreateAssignmentRequest, assigned_by: Uuid) -> Result<Assignment, AppError> {
        let assignment = sqlx::query_as::<_, Assignment>(
            r#"
            INSERT INTO assignments (asset_id, base, quantity, assigned_to, assigned_by, start_date, notes)
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, NOW()), $7)
            RETURNING *
            "#,
        )
        .bind(req.asset_id)
        .bind(&req.base)
        .bind(req.quantity)
        .bind(&req.assigned_to)
        .bind(assigned_by)
        .bind(req.start_date)
        .bind(&req.notes)
        .fetch_one(&self.db)
        .await?;

        Ok(assignment)
    }

    /// 结束分配时写入结束日期
    /// 仅当当前状态仍为 `from` 时更新；离开 active 时写入结束时间
    pub async fn update_status(
        &self,
        id: Uuid,
        from: AssignmentStatus,
        status: AssignmentStatus,
    ) -> Result<Option<Assignment>, AppError> {
        let assignment = sqlx::query_as::<_, Assignment>(
            r#"
            UPDATE assignments
            SET status = $2,
                end_date = CASE WHEN $2 = 'active'::assignment_status THEN end_date ELSE NOW() END,
                updated_at = NOW()
            WHERE id = $1 AND status = $3
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(from)
        .fetch_optional(&self.db)
        .await?;

        Ok(assignment)
    }
}
