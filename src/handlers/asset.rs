//! 资产管理的 HTTP 处理器

use crate::{
    auth::middleware::AuthContext,
    error::AppError,
    extract::{AppJson, AppPath, AppQuery},
    middleware::AppState,
    models::{
        activity::{resource, ActivityAction, NewActivity},
        asset::*,
        auth::ClientInfo,
        filter::{DateRange, Pagination, DEFAULT_PAGE_SIZE},
    },
    repository::AssetRepository,
    services::permission_service::{Action, Resource},
};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetListQuery {
    pub base: Option<String>,
    pub asset_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// 列出资产
pub async fn list_assets(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    AppQuery(query): AppQuery<AssetListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let permissions = &state.permission_service;
    permissions.authorize(&auth_context.user, Resource::Asset, Action::Read)?;

    let range = DateRange::parse(query.start_date.as_deref(), query.end_date.as_deref())
        .map_err(AppError::Validation)?;
    let filter = AssetFilter {
        base: permissions.effective_base(&auth_context.user, query.base)?,
        asset_type: query.asset_type.filter(|t| !t.trim().is_empty()),
        created_from: range.start,
        created_to: range.end,
    };
    let page = Pagination {
        limit: query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        offset: query.offset.unwrap_or(0),
    }
    .normalized();

    let repo = AssetRepository::new(state.db.clone());
    let assets = repo.list(&filter, page.limit, page.offset).await?;
    let total = repo.count(&filter).await?;

    Ok(Json(json!({
        "assets": assets,
        "total": total,
        "limit": page.limit,
        "offset": page.offset
    })))
}

/// 创建资产
pub async fn create_asset(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    client: ClientInfo,
    AppJson(req): AppJson<CreateAssetRequest>,
) -> Result<impl IntoResponse, AppError> {
    let permissions = &state.permission_service;
    permissions.authorize(&auth_context.user, Resource::Asset, Action::Create)?;
    req.validate()?;
    permissions.ensure_base_access(&auth_context.user, &req.base)?;

    let derived = req.balances().derive().map_err(AppError::Validation)?;

    let repo = AssetRepository::new(state.db.clone());
    let asset = repo.create(&req, derived, auth_context.user_id()).await?;

    tracing::info!(asset_id = %asset.id, base = %asset.base, "Asset created");
    state
        .activity_service
        .record(
            NewActivity::new(ActivityAction::Create, resource::ASSET)
                .actor(auth_context.user.id, &auth_context.user.username)
                .resource(asset.id)
                .details(json!({ "name": asset.name, "base": asset.base }))
                .client(&client),
        )
        .await;

    Ok((StatusCode::CREATED, Json(asset)))
}

/// 获取资产详情
pub async fn get_asset(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state
        .permission_service
        .authorize(&auth_context.user, Resource::Asset, Action::Read)?;

    let repo = AssetRepository::new(state.db.clone());
    let asset = repo.get(id).await?.ok_or_else(|| AppError::not_found("Asset"))?;
    state
        .permission_service
        .ensure_base_access(&auth_context.user, &asset.base)?;

    Ok(Json(asset))
}

/// 更新资产，重新计算期末与可用数量
pub async fn update_asset(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    client: ClientInfo,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<UpdateAssetRequest>,
) -> Result<impl IntoResponse, AppError> {
    let permissions = &state.permission_service;
    permissions.authorize(&auth_context.user, Resource::Asset, Action::Update)?;
    req.validate()?;

    let repo = AssetRepository::new(state.db.clone());
    let current = repo.get(id).await?.ok_or_else(|| AppError::not_found("Asset"))?;
    permissions.ensure_base_access(&auth_context.user, &current.base)?;
    if let Some(base) = &req.base {
        permissions.ensure_base_access(&auth_context.user, base)?;
    }

    let merged = req.apply_to(&current).map_err(AppError::Validation)?;
    let asset = repo
        .update(&merged)
        .await?
        .ok_or_else(|| AppError::not_found("Asset"))?;

    state
        .activity_service
        .record(
            NewActivity::new(ActivityAction::Update, resource::ASSET)
                .actor(auth_context.user.id, &auth_context.user.username)
                .resource(asset.id)
                .details(json!({
                    "closingBalance": asset.closing_balance,
                    "available": asset.available
                }))
                .client(&client),
        )
        .await;

    Ok(Json(asset))
}
