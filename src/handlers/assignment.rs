//! 分配记录的 HTTP 处理器

use crate::{
    auth::middleware::AuthContext,
    error::AppError,
    extract::{AppJson, AppPath, AppQuery},
    middleware::AppState,
    models::{
        activity::{resource, ActivityAction, NewActivity},
        assignment::*,
        auth::ClientInfo,
        filter::RecordListQuery,
    },
    repository::{AssetRepository, AssignmentRepository},
    services::permission_service::{Action, Resource},
};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// 列出分配记录
pub async fn list_assignments(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    AppQuery(query): AppQuery<RecordListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let permissions = &state.permission_service;
    permissions.authorize(&auth_context.user, Resource::Assignment, Action::Read)?;

    let base = permissions.effective_base(&auth_context.user, query.base.clone())?;
    let filter = query.into_filter(base).map_err(AppError::Validation)?;

    let assignments = AssignmentRepository::new(state.db.clone()).list(&filter).await?;

    Ok(Json(json!({
        "assignments": assignments,
        "count": assignments.len(),
        "limit": filter.limit,
        "offset": filter.offset
    })))
}

/// 创建分配
pub async fn create_assignment(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    client: ClientInfo,
    AppJson(req): AppJson<CreateAssignmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let permissions = &state.permission_service;
    permissions.authorize(&auth_context.user, Resource::Assignment, Action::Create)?;
    req.validate()?;
    permissions.ensure_base_access(&auth_context.user, &req.base)?;

    let asset = AssetRepository::new(state.db.clone())
        .get(req.asset_id)
        .await?
        .ok_or_else(|| AppError::not_found("Asset"))?;
    if asset.base != req.base {
        return Err(AppError::validation("Asset does not belong to this base"));
    }

    let assignment = AssignmentRepository::new(state.db.clone())
        .create(&req, auth_context.user_id())
        .await?;

    state
        .activity_service
        .record(
            NewActivity::new(ActivityAction::Create, resource::ASSIGNMENT)
                .actor(auth_context.user.id, &auth_context.user.username)
                .resource(assignment.id)
                .details(json!({
                    "assetId": assignment.asset_id,
                    "assignedTo": assignment.assigned_to,
                    "quantity": assignment.quantity
                }))
                .client(&client),
        )
        .await;

    Ok((StatusCode::CREATED, Json(assignment)))
}

/// 获取分配详情
pub async fn get_assignment(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let permissions = &state.permission_service;
    permissions.authorize(&auth_context.user, Resource::Assignment, Action::Read)?;

    let assignment = AssignmentRepository::new(state.db.clone())
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("Assignment"))?;
    permissions.ensure_base_access(&auth_context.user, &assignment.base)?;

    Ok(Json(assignment))
}

/// 结束分配（归还或丢失）
pub async fn update_assignment_status(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    client: ClientInfo,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<UpdateAssignmentStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let permissions = &state.permission_service;
    permissions.authorize(&auth_context.user, Resource::Assignment, Action::Update)?;

    let repo = AssignmentRepository::new(state.db.clone());
    let current = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("Assignment"))?;
    permissions.ensure_base_access(&auth_context.user, &current.base)?;

    if !current.status.can_transition_to(req.status) {
        return Err(AppError::validation(format!(
            "Cannot change assignment status from {:?} to {:?}",
            current.status, req.status
        )));
    }

    let assignment = repo
        .update_status(id, current.status, req.status)
        .await?
        // 读取之后状态已被并发请求修改
        .ok_or_else(|| AppError::validation("Assignment status changed concurrently, reload and retry"))?;

    state
        .activity_service
        .record(
            NewActivity::new(ActivityAction::Update, resource::ASSIGNMENT)
                .actor(auth_context.user.id, &auth_context.user.username)
                .resource(assignment.id)
                .details(json!({ "from": current.status, "to": assignment.status }))
                .client(&client),
        )
        .await;

    Ok(Json(assignment))
}
