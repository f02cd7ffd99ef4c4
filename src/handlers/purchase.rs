//! 采购记录的 HTTP 处理器

use crate::{
    auth::middleware::AuthContext,
    error::AppError,
    extract::{AppJson, AppPath, AppQuery},
    middleware::AppState,
    models::{
        activity::{resource, ActivityAction, NewActivity},
        auth::ClientInfo,
        filter::RecordListQuery,
        purchase::*,
    },
    repository::{AssetRepository, PurchaseRepository},
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

/// 列出采购记录
pub async fn list_purchases(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    AppQuery(query): AppQuery<RecordListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let permissions = &state.permission_service;
    permissions.authorize(&auth_context.user, Resource::Purchase, Action::Read)?;

    let base = permissions.effective_base(&auth_context.user, query.base.clone())?;
    let filter = query.into_filter(base).map_err(AppError::Validation)?;

    let purchases = PurchaseRepository::new(state.db.clone()).list(&filter).await?;

    Ok(Json(json!({
        "purchases": purchases,
        "count": purchases.len(),
        "limit": filter.limit,
        "offset": filter.offset
    })))
}

/// 创建采购记录
pub async fn create_purchase(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    client: ClientInfo,
    AppJson(req): AppJson<CreatePurchaseRequest>,
) -> Result<impl IntoResponse, AppError> {
    let permissions = &state.permission_service;
    permissions.authorize(&auth_context.user, Resource::Purchase, Action::Create)?;
    req.validate()?;
    permissions.ensure_base_access(&auth_context.user, &req.base)?;

    let asset = AssetRepository::new(state.db.clone())
        .get(req.asset_id)
        .await?
        .ok_or_else(|| AppError::not_found("Asset"))?;
    if asset.base != req.base {
        return Err(AppError::validation("Asset does not belong to this base"));
    }

    let purchase = PurchaseRepository::new(state.db.clone())
        .create(&req, auth_context.user_id())
        .await?;

    state
        .activity_service
        .record(
            NewActivity::new(ActivityAction::Create, resource::PURCHASE)
                .actor(auth_context.user.id, &auth_context.user.username)
                .resource(purchase.id)
                .details(json!({
                    "assetId": purchase.asset_id,
                    "base": purchase.base,
                    "quantity": purchase.quantity
                }))
                .client(&client),
        )
        .await;

    Ok((StatusCode::CREATED, Json(purchase)))
}

/// 获取采购详情
pub async fn get_purchase(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let permissions = &state.permission_service;
    permissions.authorize(&auth_context.user, Resource::Purchase, Action::Read)?;

    let purchase = PurchaseRepository::new(state.db.clone())
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("Purchase"))?;
    permissions.ensure_base_access(&auth_context.user, &purchase.base)?;

    Ok(Json(purchase))
}

/// 更新采购状态
pub async fn update_purchase_status(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    client: ClientInfo,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<UpdatePurchaseStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let permissions = &state.permission_service;
    permissions.authorize(&auth_context.user, Resource::Purchase, Action::Update)?;

    let repo = PurchaseRepository::new(state.db.clone());
    let current = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("Purchase"))?;
    permissions.ensure_base_access(&auth_context.user, &current.base)?;

    if !current.status.can_transition_to(req.status) {
        return Err(AppError::validation(format!(
            "Cannot change purchase status from {:?} to {:?}",
            current.status, req.status
        )));
    }

    let approved_by = req.status.marks_approval().then(|| auth_context.user_id());
    let purchase = repo
        .update_status(id, current.status, req.status, approved_by)
        .await?
        // 读取之后状态已被并发请求修改
        .ok_or_else(|| AppError::validation("Purchase status changed concurrently, reload and retry"))?;

    state
        .activity_service
        .record(
            NewActivity::new(ActivityAction::Update, resource::PURCHASE)
                .actor(auth_context.user.id, &auth_context.user.username)
                .resource(purchase.id)
                .details(json!({ "from": current.status, "to": purchase.status }))
                .client(&client),
        )
        .await;

    Ok(Json(purchase))
}
