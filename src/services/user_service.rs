//! 用户管理服务（仅管理员）

use crate::{
    auth::middleware::AuthContext,
    error::AppError,
    models::{
        activity::{resource, ActivityAction, NewActivity},
        auth::ClientInfo,
        user::*,
    },
    repository::{session_repo::SessionRepository, user_repo::UserRepository},
    services::activity_service::ActivityService,
};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

pub struct UserService {
    db: PgPool,
    activity: Arc<ActivityService>,
}

impl UserService {
    pub fn new(db: PgPool, activity: Arc<ActivityService>) -> Self {
        Self { db, activity }
    }

    pub async fn list(&self, limit: i64, offset: i64) -> Result<(Vec<User>, i64), AppError> {
        let repo = UserRepository::new(self.db.clone());
        let users = repo.list(limit, offset).await?;
        let total = repo.count().await?;
        Ok((users, total))
    }

    pub async fn get(&self, id: Uuid) -> Result<User, AppError> {
        UserRepository::new(self.db.clone())
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))
    }

    /// 更新用户；停用账号时撤销其全部会话
    pub async fn update(
        &self,
        actor: &AuthContext,
        id: Uuid,
        req: UpdateUserRequest,
        client: &ClientInfo,
    ) -> Result<User, AppError> {
        req.validate()?;

        let current = self.get(id).await?;
        let role = req.role.unwrap_or(current.role);
        let assigned_base = req.assigned_base.as_deref().or(current.assigned_base.as_deref());
        check_role_base(role, assigned_base).map_err(AppError::Validation)?;

        if id == actor.user.id && (req.is_active == Some(false) || req.role.is_some_and(|r| r != Role::Admin)) {
            return Err(AppError::validation(
                "Administrators cannot deactivate or demote their own account",
            ));
        }

        let repo = UserRepository::new(self.db.clone());
        let updated = repo
            .update(id, &req)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        self.activity
            .record(
                NewActivity::new(ActivityAction::Update, resource::USER)
                    .actor(actor.user.id, &actor.user.username)
                    .resource(updated.id)
                    .details(json!({
                        "role": updated.role,
                        "assignedBase": updated.assigned_base,
                        "isActive": updated.is_active,
                    }))
                    .client(client),
            )
            .await;

        if current.is_active && !updated.is_active {
            let revoked = SessionRepository::new(self.db.clone())
                .delete_all_for_user(updated.id)
                .await?;
            tracing::info!(user_id = %updated.id, sessions_revoked = revoked, "User deactivated");

            self.activity
                .record(
                    NewActivity::new(ActivityAction::Deactivate, resource::USER)
                        .actor(actor.user.id, &actor.user.username)
                        .resource(updated.id)
                        .details(json!({ "sessionsRevoked": revoked }))
                        .client(client),
                )
                .await;
        }

        Ok(updated)
    }
}
