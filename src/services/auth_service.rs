//! 认证服务：登录、登出、会话解析与账号注册

use crate::{
    auth::{middleware::AuthContext, password::PasswordHasher, token::SessionToken},
    config::{BootstrapConfig, SecurityConfig},
    error::AppError,
    models::{
        activity::{resource, ActivityAction, NewActivity},
        auth::*,
        session::NewSession,
        user::*,
    },
    repository::{session_repo::SessionRepository, user_repo::UserRepository},
    services::activity_service::ActivityService,
};
use secrecy::ExposeSecret;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use validator::Validate;

/// Why a login attempt was rejected. Only recorded internally; the client
/// always sees the same generic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFailure {
    NotFound,
    InactiveAccount,
    CredentialMismatch,
}

impl LoginFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoginFailure::NotFound => "not_found",
            LoginFailure::InactiveAccount => "inactive_account",
            LoginFailure::CredentialMismatch => "credential_mismatch",
        }
    }
}

pub struct AuthService {
    db: PgPool,
    security: SecurityConfig,
    hasher: PasswordHasher,
    activity: Arc<ActivityService>,
}

impl AuthService {
    pub fn new(db: PgPool, security: SecurityConfig, activity: Arc<ActivityService>) -> Self {
        Self {
            db,
            security,
            hasher: PasswordHasher::new(),
            activity,
        }
    }

    /// 用户登录
    pub async fn login(&self, req: LoginRequest, client: &ClientInfo) -> Result<LoginResponse, AppError> {
        let user_repo = UserRepository::new(self.db.clone());

        let user = match user_repo.find_by_username(&req.username).await? {
            Some(user) => user,
            None => return Err(self.reject_login(&req.username, None, LoginFailure::NotFound, client).await),
        };

        if !user.is_active {
            return Err(self
                .reject_login(&req.username, Some(&user), LoginFailure::InactiveAccount, client)
                .await);
        }

        match self.hasher.verify(&req.password, &user.password_hash) {
            Ok(()) => {}
            Err(AppError::InvalidCredentials) => {
                return Err(self
                    .reject_login(&req.username, Some(&user), LoginFailure::CredentialMismatch, client)
                    .await);
            }
            Err(e) => return Err(e),
        }

        let token = SessionToken::generate();
        let expires_at =
            chrono::Utc::now() + chrono::Duration::seconds(self.security.session_ttl_secs as i64);

        let session_repo = SessionRepository::new(self.db.clone());
        session_repo
            .create(&NewSession {
                token_hash: SessionToken::hash(&token),
                user_id: user.id,
                ip_address: client.ip_address.clone(),
                user_agent: client.user_agent.clone(),
                expires_at,
            })
            .await?;

        user_repo.touch_last_login(user.id).await?;

        metrics::counter!("auth_logins_total", "outcome" => "success").increment(1);
        tracing::info!(user_id = %user.id, username = %user.username, "User logged in");

        self.activity
            .record(
                NewActivity::new(ActivityAction::Login, resource::AUTH)
                    .actor(user.id, &user.username)
                    .client(client),
            )
            .await;

        Ok(LoginResponse {
            token,
            expires_at,
            user: UserResponse::from(user),
        })
    }

    async fn reject_login(
        &self,
        username: &str,
        user: Option<&User>,
        reason: LoginFailure,
        client: &ClientInfo,
    ) -> AppError {
        metrics::counter!("auth_logins_total", "outcome" => reason.as_str()).increment(1);
        tracing::warn!(username = %username, reason = reason.as_str(), "Login rejected");

        let mut entry = NewActivity::new(ActivityAction::FailedLogin, resource::AUTH)
            .details(json!({ "reason": reason.as_str() }))
            .client(client);
        entry = match user {
            Some(user) => entry.actor(user.id, &user.username),
            None => NewActivity {
                username: Some(username.to_string()),
                ..entry
            },
        };
        self.activity.record(entry).await;

        AppError::InvalidCredentials
    }

    /// 登出当前会话
    pub async fn logout(&self, ctx: &AuthContext, token: &str, client: &ClientInfo) -> Result<(), AppError> {
        let session_repo = SessionRepository::new(self.db.clone());
        session_repo.delete_by_hash(&SessionToken::hash(token)).await?;

        self.activity
            .record(
                NewActivity::new(ActivityAction::Logout, resource::AUTH)
                    .actor(ctx.user.id, &ctx.user.username)
                    .client(client),
            )
            .await;

        Ok(())
    }

    /// 从所有设备登出，返回删除的会话数
    pub async fn logout_all(&self, ctx: &AuthContext, client: &ClientInfo) -> Result<u64, AppError> {
        let session_repo = SessionRepository::new(self.db.clone());
        let revoked = session_repo.delete_all_for_user(ctx.user.id).await?;

        self.activity
            .record(
                NewActivity::new(ActivityAction::LogoutAll, resource::AUTH)
                    .actor(ctx.user.id, &ctx.user.username)
                    .details(json!({ "sessionsRevoked": revoked }))
                    .client(client),
            )
            .await;

        Ok(revoked)
    }

    /// 解析 Bearer 令牌对应的会话与用户
    pub async fn resolve_session(&self, token: &str) -> Result<AuthContext, AppError> {
        let session_repo = SessionRepository::new(self.db.clone());
        let found = session_repo
            .find_active_by_hash(&SessionToken::hash(token))
            .await?
            .ok_or(AppError::Unauthenticated)?;

        Ok(AuthContext {
            user: found.user,
            session_id: found.session_id,
        })
    }

    /// 注册新用户（仅管理员）
    pub async fn register(
        &self,
        actor: &AuthContext,
        req: RegisterRequest,
        client: &ClientInfo,
    ) -> Result<User, AppError> {
        req.validate()?;
        req.check_role_base().map_err(AppError::Validation)?;
        PasswordHasher::validate_password_policy(&req.password, &self.security)?;

        let password_hash = self.hasher.hash(&req.password)?;
        let user_repo = UserRepository::new(self.db.clone());
        let user = user_repo.create(&req, &password_hash).await?;

        tracing::info!(user_id = %user.id, role = %user.role, created_by = %actor.user.id, "User registered");

        self.activity
            .record(
                NewActivity::new(ActivityAction::Create, resource::USER)
                    .actor(actor.user.id, &actor.user.username)
                    .resource(user.id)
                    .details(json!({ "username": user.username, "role": user.role }))
                    .client(client),
            )
            .await;

        Ok(user)
    }

    /// 修改密码，并撤销除当前会话外的所有会话
    pub async fn change_password(
        &self,
        ctx: &AuthContext,
        req: ChangePasswordRequest,
        client: &ClientInfo,
    ) -> Result<u64, AppError> {
        match self.hasher.verify(&req.current_password, &ctx.user.password_hash) {
            Ok(()) => {}
            Err(AppError::InvalidCredentials) => {
                return Err(AppError::validation("Current password is incorrect"));
            }
            Err(e) => return Err(e),
        }

        if req.current_password == req.new_password {
            return Err(AppError::validation(
                "New password must differ from the current password",
            ));
        }
        PasswordHasher::validate_password_policy(&req.new_password, &self.security)?;

        let password_hash = self.hasher.hash(&req.new_password)?;
        let user_repo = UserRepository::new(self.db.clone());
        if !user_repo.update_password(ctx.user.id, &password_hash).await? {
            return Err(AppError::not_found("User"));
        }

        let session_repo = SessionRepository::new(self.db.clone());
        let revoked = session_repo
            .delete_all_except(ctx.user.id, ctx.session_id)
            .await?;

        tracing::info!(user_id = %ctx.user.id, sessions_revoked = revoked, "Password changed");

        self.activity
            .record(
                NewActivity::new(ActivityAction::PasswordChange, resource::USER)
                    .actor(ctx.user.id, &ctx.user.username)
                    .resource(ctx.user.id)
                    .details(json!({ "sessionsRevoked": revoked }))
                    .client(client),
            )
            .await;

        Ok(revoked)
    }

    /// 首次启动时创建管理员账号
    pub async fn bootstrap_admin(&self, bootstrap: &BootstrapConfig) -> Result<Option<User>, AppError> {
        let user_repo = UserRepository::new(self.db.clone());
        if user_repo.count().await? > 0 {
            return Ok(None);
        }

        let Some(password) = bootstrap.admin_password.as_ref() else {
            tracing::warn!("No users exist and no bootstrap admin password is configured");
            return Ok(None);
        };

        PasswordHasher::validate_password_policy(password.expose_secret(), &self.security)?;
        let password_hash = self.hasher.hash(password.expose_secret())?;

        let req = RegisterRequest {
            username: bootstrap.admin_username.clone(),
            email: bootstrap.admin_email.clone(),
            password: String::new(),
            full_name: bootstrap.admin_full_name.clone(),
            role: Role::Admin,
            assigned_base: None,
        };
        let user = user_repo.create(&req, &password_hash).await?;

        tracing::info!(user_id = %user.id, username = %user.username, "Bootstrap admin created");
        Ok(Some(user))
    }

    /// 清理过期会话
    pub async fn cleanup_expired_sessions(&self) -> Result<u64, AppError> {
        let session_repo = SessionRepository::new(self.db.clone());
        let removed = session_repo.cleanup_expired().await?;

        if removed > 0 {
            tracing::info!(removed, "Expired sessions removed");
        }
        metrics::counter!("sessions_expired_removed_total").increment(removed);

        Ok(removed)
    }
}
