//! 操作日志服务
//!
//! Recording is best-effort: a failed insert is logged and counted but never
//! fails the request that triggered it.

use crate::{
    error::AppError,
    models::activity::*,
    repository::activity_repo::ActivityRepository,
};
use sqlx::PgPool;

pub struct ActivityService {
    db: PgPool,
}

impl ActivityService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 追加操作日志，失败时仅记录警告
    pub async fn record(&self, entry: NewActivity) {
        let repo = ActivityRepository::new(self.db.clone());

        if let Err(e) = repo.insert(&entry).await {
            metrics::counter!("activity_log_write_failures_total", "action" => entry.action.as_str())
                .increment(1);
            tracing::warn!(
                error = %e,
                action = %entry.action,
                resource_type = entry.resource_type,
                "Failed to record activity"
            );
        }
    }

    /// 查询操作日志
    pub async fn query(
        &self,
        filters: &ActivityLogFilters,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ActivityLog>, AppError> {
        let repo = ActivityRepository::new(self.db.clone());
        repo.query(filters, limit, offset).await
    }

    /// 查询操作日志数量
    pub async fn count(&self, filters: &ActivityLogFilters) -> Result<i64, AppError> {
        let repo = ActivityRepository::new(self.db.clone());
        repo.count(filters).await
    }
}
