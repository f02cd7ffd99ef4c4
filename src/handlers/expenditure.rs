//! 消耗记录的 HTTP 处理器

use crate::{
    auth::middleware::AuthContext,
    error::AppError,
    extract::{AppJson, AppPath, AppQuery},
    middleware::AppState,
    models::{
        activity::{resource, ActivityAction, NewActivity},
        auth::ClientInfo,
        expenditure::*,
        filter::RecordListQuery,
    },
    repository::{AssetRepository, ExpenditureRepository},
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

/// 列出消耗记录
pub async fn list_expenditures(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    AppQuery(query): AppQuery<RecordListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let permissions = &state.permission_service;
    permissions.authorize(&auth_context.user, Resource::Expenditure, Action::Read)?;

    let base = permissions.effective_base(&auth_context.user, query.base.clone())?;
    let filter = query.into_filter(base).map_err(AppError::Validation)?;

    let expenditures = ExpenditureRepository::new(state.db.clone()).list(&filter).await?;

    Ok(Json(json!({
        "expenditures": expenditures,
        "count": expenditures.len(),
        "limit": filter.limit,
        "offset": filter.offset
    })))
}

/// 创建消耗记录
pub async fn create_expenditure(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    client: ClientInfo,
    AppJson(req): AppJson<CreateExpenditureRequest>,
) -> Result<impl IntoResponse, AppError> {
    let permissions = &state.permission_service;
    permissions.authorize(&auth_context.user, Resource::Expenditure, Action::Create)?;
    req.validate()?;
    permissions.ensure_base_access(&auth_context.user, &req.base)?;

    let asset = AssetRepository::new(state.db.clone())
        .get(req.asset_id)
        .await?
        .ok_or_else(|| AppError::not_found("Asset"))?;
    if asset.base != req.base {
        return Err(AppError::validation("Asset does not belong to this base"));
    }

    let expenditure = ExpenditureRepository::new(state.db.clone())
        .create(&req, auth_context.user_id())
        .await?;

    state
        .activity_service
        .record(
            NewActivity::new(ActivityAction::Create, resource::EXPENDITURE)
                .actor(auth_context.user.id, &auth_context.user.username)
                .resource(expenditure.id)
                .details(json!({
                    "assetId": expenditure.asset_id,
                    "quantity": expenditure.quantity,
                    "reason": expenditure.reason
                }))
                .client(&client),
        )
        .await;

    Ok((StatusCode::CREATED, Json(expenditure)))
}

/// 获取消耗详情
pub async fn get_expenditure(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let permissions = &state.permission_service;
    permissions.authorize(&auth_context.user, Resource::Expenditure, Action::Read)?;

    let expenditure = ExpenditureRepository::new(state.db.clone())
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("Expenditure"))?;
    permissions.ensure_base_access(&auth_context.user, &expenditure.base)?;

    Ok(Json(expenditure))
}
