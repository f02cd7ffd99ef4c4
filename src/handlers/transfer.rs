//! 调拨记录的 HTTP 处理器

use crate::{
    auth::middleware::AuthContext,
    error::AppError,
    extract::{AppJson, AppPath, AppQuery},
    middleware::AppState,
    models::{
        activity::{resource, ActivityAction, NewActivity},
        auth::ClientInfo,
        filter::RecordListQuery,
        transfer::*,
        user::User,
    },
    repository::{AssetRepository, TransferRepository},
    services::permission_service::{Action, PermissionService, Resource},
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

/// A scoped user sees a transfer if their base is either end of it
fn ensure_transfer_access(
    permissions: &PermissionService,
    user: &User,
    transfer: &Transfer,
) -> Result<(), AppError> {
    permissions
        .ensure_base_access(user, &transfer.from_base)
        .or_else(|_| permissions.ensure_base_access(user, &transfer.to_base))
}

/// 列出调拨记录
pub async fn list_transfers(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    AppQuery(query): AppQuery<RecordListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let permissions = &state.permission_service;
    permissions.authorize(&auth_context.user, Resource::Transfer, Action::Read)?;

    let base = permissions.effective_base(&auth_context.user, query.base.clone())?;
    let filter = query.into_filter(base).map_err(AppError::Validation)?;

    let repo = TransferRepository::new(state.db.clone());
    let transfers = repo.list(&filter).await?;

    Ok(Json(json!({
        "transfers": transfers,
        "count": transfers.len(),
        "limit": filter.limit,
        "offset": filter.offset
    })))
}

/// 创建调拨
pub async fn create_transfer(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    client: ClientInfo,
    AppJson(req): AppJson<CreateTransferRequest>,
) -> Result<impl IntoResponse, AppError> {
    let permissions = &state.permission_service;
    permissions.authorize(&auth_context.user, Resource::Transfer, Action::Create)?;
    req.validate()?;
    req.check_bases().map_err(AppError::Validation)?;
    permissions.ensure_base_access(&auth_context.user, &req.from_base)?;

    let asset = AssetRepository::new(state.db.clone())
        .get(req.asset_id)
        .await?
        .ok_or_else(|| AppError::not_found("Asset"))?;
    if asset.base != req.from_base {
        return Err(AppError::validation("Asset is not held at fromBase"));
    }

    let repo = TransferRepository::new(state.db.clone());
    let transfer = repo.create(&req, auth_context.user_id()).await?;

    tracing::info!(
        transfer_id = %transfer.id,
        from_base = %transfer.from_base,
        to_base = %transfer.to_base,
        quantity = transfer.quantity,
        "Transfer created"
    );
    state
        .activity_service
        .record(
            NewActivity::new(ActivityAction::Create, resource::TRANSFER)
                .actor(auth_context.user.id, &auth_context.user.username)
                .resource(transfer.id)
                .details(json!({
                    "assetId": transfer.asset_id,
                    "fromBase": transfer.from_base,
                    "toBase": transfer.to_base,
                    "quantity": transfer.quantity
                }))
                .client(&client),
        )
        .await;

    Ok((StatusCode::CREATED, Json(transfer)))
}

/// 获取调拨详情
pub async fn get_transfer(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let permissions = &state.permission_service;
    permissions.authorize(&auth_context.user, Resource::Transfer, Action::Read)?;

    let transfer = TransferRepository::new(state.db.clone())
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("Transfer"))?;
    ensure_transfer_access(permissions, &auth_context.user, &transfer)?;

    Ok(Json(transfer))
}

/// 更新调拨状态
pub async fn update_transfer_status(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    client: ClientInfo,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<UpdateTransferStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let permissions = &state.permission_service;
    permissions.authorize(&auth_context.user, Resource::Transfer, Action::Update)?;

    let repo = TransferRepository::new(state.db.clone());
    let current = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("Transfer"))?;
    ensure_transfer_access(permissions, &auth_context.user, &current)?;

    if !current.status.can_transition_to(req.status) {
        return Err(AppError::validation(format!(
            "Cannot change transfer status from {:?} to {:?}",
            current.status, req.status
        )));
    }

    let approved_by = req.status.marks_approval().then(|| auth_context.user_id());
    let transfer = repo
        .update_status(id, current.status, req.status, approved_by)
        .await?
        // 读取之后状态已被并发请求修改
        .ok_or_else(|| AppError::validation("Transfer status changed concurrently, reload and retry"))?;

    state
        .activity_service
        .record(
            NewActivity::new(ActivityAction::Update, resource::TRANSFER)
                .actor(auth_context.user.id, &auth_context.user.username)
                .resource(transfer.id)
                .details(json!({ "from": current.status, "to": transfer.status }))
                .client(&client),
        )
        .await;

    Ok(Json(transfer))
}
