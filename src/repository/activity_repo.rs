//! Activity log repository (操作日志数据访问)
//!
//! The table is append-only; there is deliberately no update or delete.

use crate::{error::AppError, models::activity::*};
use sqlx::{PgPool, Row};

pub struct ActivityRepository {
    db: PgPool,
}

impl ActivityRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 追加一条操作日志
    pub async fn insert(&self, entry: &NewActivity) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO activity_logs (
                user_id, username, action, resource_type, resource_id, details, ip_address, user_agent
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(entry.user_id)
        .bind(&entry.username)
        .bind(entry.action.as_str())
        .bind(entry.resource_type)
        .bind(entry.resource_id)
        .bind(&entry.details)
        .bind(&entry.ip_address)
        .bind(&entry.user_agent)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    fn where_clause(filters: &ActivityLogFilters) -> (String, usize) {
        let mut clause = String::from(" WHERE 1=1");
        let mut index = 0;

        if filters.user_id.is_some() {
            index += 1;
            clause.push_str(&format!(" AND user_id = ${}", index));
        }
        if filters.action.is_some() {
            index += 1;
            clause.push_str(&format!(" AND action = ${}", index));
        }
        if filters.resource_type.is_some() {
            index += 1;
            clause.push_str(&format!(" AND resource_type = ${}", index));
        }
        if filters.range.start.is_some() {
            index += 1;
            clause.push_str(&format!(" AND created_at >= ${}", index));
        }
        if filters.range.end.is_some() {
            index += 1;
            clause.push_str(&format!(" AND created_at <= ${}", index));
        }

        (clause, index)
    }

    /// 查询操作日志，最新优先
    pub async fn query(
        &self,
        filters: &ActivityLogFilters,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ActivityLog>, AppError> {
        let (clause, index) = Self::where_clause(filters);
        let query = format!(
            "SELECT * FROM activity_logs{} ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
            clause,
            index + 1,
            index + 2
        );

        let mut query_builder = sqlx::query_as::<_, ActivityLog>(&query);

        if let Some(user_id) = filters.user_id {
            query_builder = query_builder.bind(user_id);
        }
        if let Some(action) = filters.action {
            query_builder = query_builder.bind(action.as_str());
        }
        if let Some(resource_type) = &filters.resource_type {
            query_builder = query_builder.bind(resource_type);
        }
        if let Some(start) = filters.range.start {
            query_builder = query_builder.bind(start);
        }
        if let Some(end) = filters.range.end {
            query_builder = query_builder.bind(end);
        }

        let logs = query_builder
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.db)
            .await?;

        Ok(logs)
    }

    /// 统计操作日志数量
    pub async fn count(&self, filters: &ActivityLogFilters) -> Result<i64, AppError> {
        let (clause, _) = Self::where_clause(filters);
        let query = format!("SELECT COUNT(*) FROM activity_logs{}", clause);

        let mut query_builder = sqlx::query(&query);

        if let Some(user_id) = filters.user_id {
            query_builder = query_builder.bind(user_id);
        }
        if let Some(action) = filters.action {
            query_builder = query_builder.bind(action.as_str());
        }
        if let Some(resource_type) = &filters.resource_type {
            query_builder = query_builder.bind(resource_type);
        }
        if let Some(start) = filters.range.start {
            query_builder = query_builder.bind(start);
        }
        if let Some(end) = filters.range.end {
            query_builder = query_builder.bind(end);
        }

        let count: i64 = query_builder.fetch_one(&self.db).await?.get(0);
        Ok(count)
    }
}
