//! 认证相关的 HTTP 处理器

use crate::{
    auth::middleware::{extract_token, AuthContext},
    error::AppError,
    extract::AppJson,
    middleware::AppState,
    models::{auth::*, user::*},
    services::permission_service::{Action, Resource},
};
use axum::{extract::State, http::HeaderMap, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

/// 登录
pub async fn login(
    State(state): State<Arc<AppState>>,
    client: ClientInfo,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.username.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::validation("Username and password are required"));
    }

    let response = state.auth_service.login(req, &client).await?;
    Ok(Json(response))
}

/// 注册新用户（仅管理员）
pub async fn register(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    client: ClientInfo,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    state
        .permission_service
        .authorize(&auth_context.user, Resource::User, Action::Create)?;

    let user = state.auth_service.register(&auth_context, req, &client).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// 登出当前会话
pub async fn logout(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    client: ClientInfo,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let token = extract_token(&headers)?;
    state.auth_service.logout(&auth_context, &token, &client).await?;

    Ok(Json(json!({ "message": "Logged out successfully" })))
}

/// 从所有设备登出
pub async fn logout_all(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    client: ClientInfo,
) -> Result<impl IntoResponse, AppError> {
    let revoked = state.auth_service.logout_all(&auth_context, &client).await?;

    Ok(Json(json!({
        "message": "Logged out from all devices",
        "sessionsRevoked": revoked
    })))
}

/// 获取当前用户信息
pub async fn me(auth_context: AuthContext) -> Result<impl IntoResponse, AppError> {
    Ok(Json(UserResponse::from(auth_context.user)))
}

/// 修改密码
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    client: ClientInfo,
    AppJson(req): AppJson<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    let revoked = state
        .auth_service
        .change_password(&auth_context, req, &client)
        .await?;

    Ok(Json(json!({
        "message": "Password changed successfully",
        "sessionsRevoked": revoked
    })))
}
