//! Asset repository (资产数据访问)

use crate::{error::AppError, models::asset::*};
use sqlx::PgPool;
use uuid::Uuid;

const DUPLICATE_ASSET: &str = "An asset with this name already exists at this base";

pub struct AssetRepository {
    db: PgPool,
}

impl AssetRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    fn where_clause(filter: &AssetFilter) -> (String, usize) {
        let mut clause = String::from(" WHERE 1=1");
        let mut index = 0;

        if filter.base.is_some() {
            index += 1;
            clause.push_str(&format!(" AND base = ${}", index));
        }
        if filter.asset_type.is_some() {
            index += 1;
            clause.push_str(&format!(" AND asset_type = ${}", index));
        }
        if filter.created_from.is_some() {
            index += 1;
            clause.push_str(&format!(" AND created_at >= ${}", index));
        }
        if filter.created_to.is_some() {
            index += 1;
            clause.push_str(&format!(" AND created_at <= ${}", index));
        }

        (clause, index)
    }

    /// 分页列出资产
    pub async fn list(&self, filter: &AssetFilter, limit: i64, offset: i64) -> Result<Vec<Asset>, AppError> {
        let (clause, index) = Self::where_clause(filter);
        let query = format!(
            "SELECT * FROM assets{} ORDER BY base, name LIMIT ${} OFFSET ${}",
            clause,
            index + 1,
            index + 2
        );

        let mut query_builder = sqlx::query_as::<_, Asset>(&query);
        if let Some(base) = &filter.base {
            query_builder = query_builder.bind(base);
        }
        if let Some(asset_type) = &filter.asset_type {
            query_builder = query_builder.bind(asset_type);
        }
        if let Some(from) = filter.created_from {
            query_builder = query_builder.bind(from);
        }
        if let Some(to) = filter.created_to {
            query_builder = query_builder.bind(to);
        }

        let assets = query_builder
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.db)
            .await?;

        Ok(assets)
    }

    /// 查询全部匹配资产（仪表盘汇总使用）
    pub async fn list_all(&self, filter: &AssetFilter) -> Result<Vec<Asset>, AppError> {
        let (clause, _) = Self::where_clause(filter);
        let query = format!("SELECT * FROM assets{}", clause);

        let mut query_builder = sqlx::query_as::<_, Asset>(&query);
        if let Some(base) = &filter.base {
            query_builder = query_builder.bind(base);
        }
        if let Some(asset_type) = &filter.asset_type {
            query_builder = query_builder.bind(asset_type);
        }
        if let Some(from) = filter.created_from {
            query_builder = query_builder.bind(from);
        }
        if let Some(to) = filter.created_to {
            query_builder = query_builder.bind(to);
        }

        let assets = query_builder.fetch_all(&self.db).await?;
        Ok(assets)
    }

    /// 统计资产数量
    pub async fn count(&self, filter: &AssetFilter) -> Result<i64, AppError> {
        let (clause, _) = Self::where_clause(filter);
        let query = format!("SELECT COUNT(*) FROM assets{}", clause);

        let mut query_builder = sqlx::query_scalar::<_, i64>(&query);
        if let Some(base) = &filter.base {
            query_builder = query_builder.bind(base);
        }
        if let Some(asset_type) = &filter.asset_type {
            query_builder = query_builder.bind(asset_type);
        }
        if let Some(from) = filter.created_from {
            query_builder = query_builder.bind(from);
        }
        if let Some(to) = filter.created_to {
            query_builder = query_builder.bind(to);
        }

        let count = query_builder.fetch_one(&self.db).await?;
        Ok(count)
    }

    /// 获取资产
    pub async fn get(&self, id: Uuid) -> Result<Option<Asset>, AppError> {
        let asset = sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(asset)
    }

    /// 创建资产
    pub async fn create(
        &self,
        req: &CreateAssetRequest,
        derived: DerivedBalances,
        created_by: Uuid,
    ) -> Result<Asset, AppError> {
        sqlx::query_as::<_, Asset>(
            r#"
            INSERT INTO assets (
                name, asset_type, base, opening_balance, closing_balance, purchases,
                transfer_in, transfer_out, assigned, expended, available, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(&req.name)
        .bind(&req.asset_type)
        .bind(&req.base)
        .bind(req.opening_balance)
        .bind(derived.closing_balance)
        .bind(req.purchases)
        .bind(req.transfer_in)
        .bind(req.transfer_out)
        .bind(req.assigned)
        .bind(req.expended)
        .bind(derived.available)
        .bind(created_by)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::from_unique_violation(e, DUPLICATE_ASSET))
    }

    /// 保存已合并的资产
    pub async fn update(&self, asset: &Asset) -> Result<Option<Asset>, AppError> {
        sqlx::query_as::<_, Asset>(
            r#"
            UPDATE assets
            SET
                name = $2,
                asset_type = $3,
                base = $4,
                opening_balance = $5,
                closing_balance = $6,
                purchases = $7,
                transfer_in = $8,
                transfer_out = $9,
                assigned = $10,
                expended = $11,
                available = $12,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(asset.id)
        .bind(&asset.name)
        .bind(&asset.asset_type)
        .bind(&asset.base)
        .bind(asset.opening_balance)
        .bind(asset.closing_balance)
        .bind(asset.purchases)
        .bind(asset.transfer_in)
        .bind(asset.transfer_out)
        .bind(asset.assigned)
        .bind(asset.expended)
        .bind(asset.available)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| AppError::from_unique_violation(e, DUPLICATE_ASSET))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_where_clause_numbers_placeholders() {
        let filter = AssetFilter {
            base: Some("Base-A".to_string()),
            asset_type: None,
            created_from: Some(chrono::Utc::now()),
            created_to: None,
        };
        let (clause, index) = AssetRepository::where_clause(&filter);

        assert_eq!(clause, " WHERE 1=1 AND base = $1 AND created_at >= $2");
        assert_eq!(index, 2);
    }
}
