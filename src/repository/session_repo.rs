//! Session repository (会话数据访问)

use crate::{
    error::AppError,
    models::{
        session::{NewSession, Session},
        user::User,
    },
};
use sqlx::PgPool;
use uuid::Uuid;

/// An active session together with its (active) owner
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionUser {
    pub session_id: Uuid,
    #[sqlx(flatten)]
    pub user: User,
}

pub struct SessionRepository {
    db: PgPool,
}

impl SessionRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 创建会话
    pub async fn create(&self, session: &NewSession) -> Result<Session, AppError> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (token_hash, user_id, ip_address, user_agent, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&session.token_hash)
        .bind(session.user_id)
        .bind(&session.ip_address)
        .bind(&session.user_agent)
        .bind(session.expires_at)
        .fetch_one(&self.db)
        .await?;

        Ok(session)
    }

    /// 根据令牌哈希查找未过期会话及其活跃用户
    pub async fn find_active_by_hash(&self, token_hash: &str) -> Result<Option<SessionUser>, AppError> {
        let row = sqlx::query_as::<_, SessionUser>(
            r#"
            SELECT s.id AS session_id, u.*
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token_hash = $1
              AND s.expires_at > NOW()
              AND u.is_active = TRUE
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.db)
        .await?;

        Ok(row)
    }

    /// 删除单个会话
    pub async fn delete_by_hash(&self, token_hash: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// 删除用户所有会话
    pub async fn delete_all_for_user(&self, user_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected())
    }

    /// 删除用户除当前会话外的所有会话
    pub async fn delete_all_except(&self, user_id: Uuid, keep_session_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1 AND id <> $2")
            .bind(user_id)
            .bind(keep_session_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn count_for_user(&self, user_id: Uuid) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sessions WHERE user_id = $1 AND expires_at > NOW()",
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(count)
    }

    /// 清理过期会话
    pub async fn cleanup_expired(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected())
    }
}
