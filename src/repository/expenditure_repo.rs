//! Expenditure repository (消耗数据访问)

use super::ledger::{bind_filter, EXPENDITURES};
use crate::{
    error::AppError,
    models::{expenditure::*, filter::RecordFilter},
};
use sqlx::PgPool;
use uuid::Uuid;

pub struct ExpenditureRepository {
    db: PgPool,
}

impl ExpenditureRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list(&self, filter: &RecordFilter) -> Result<Vec<Expenditure>, AppError> {
        let query = EXPENDITURES.select_sql(filter);
        let expenditures = bind_filter(sqlx::query_as::<_, Expenditure>(&query), filter)
            .fetch_all(&self.db)
            .await?;

        Ok(expenditures)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Expenditure>, AppError> {
        let expenditure = sqlx::query_as::<_, Expenditure>("SELECT * FROM expenditures WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(expenditure)
    }

    pub async fn create(&self, req: &CreateExpenditureRequest, authorized_by: Uuid) -> Result<Expenditure, AppError> {
        let expenditure = sqlx::query_as::<_, Expenditure>(
            r#"
            INSERT INTO expenditures (asset_id, base, quantity, reason, authorized_by, expenditure_date, notes)
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, NOW()), $7)
            RETURNING *
            "#,
        )
        .bind(req.asset_id)
        .bind(&req.base)
        .bind(req.quantity)
        .bind(&req.reason)
        .bind(authorized_by)
        .bind(req.expenditure_date)
        .bind(&req.notes)
        .fetch_one(&self.db)
        .await?;

        Ok(expenditure)
    }
}
