//! 用户管理的 HTTP 处理器（仅管理员）

use crate::{
    auth::middleware::AuthContext,
    error::AppError,
    extract::{AppJson, AppPath, AppQuery},
    middleware::AppState,
    models::{auth::ClientInfo, filter::Pagination, user::*},
    services::permission_service::{Action, Resource},
};
use axum::{
    extract::State,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// 列出用户
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    AppQuery(page): AppQuery<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    state
        .permission_service
        .authorize(&auth_context.user, Resource::User, Action::Read)?;

    let page = page.normalized();
    let (users, total) = state.user_service.list(page.limit, page.offset).await?;
    let users: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();

    Ok(Json(json!({
        "users": users,
        "total": total,
        "limit": page.limit,
        "offset": page.offset
    })))
}

/// 获取用户详情
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state
        .permission_service
        .authorize(&auth_context.user, Resource::User, Action::Read)?;

    let user = state.user_service.get(id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// 更新用户
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    client: ClientInfo,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    state
        .permission_service
        .authorize(&auth_context.user, Resource::User, Action::Update)?;

    let user = state
        .user_service
        .update(&auth_context, id, req, &client)
        .await?;
    Ok(Json(UserResponse::from(user)))
}
