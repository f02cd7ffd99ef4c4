//! 仪表盘 HTTP 处理器

use crate::{
    auth::middleware::AuthContext,
    error::AppError,
    extract::{AppPath, AppQuery},
    middleware::AppState,
    models::dashboard::DashboardQuery,
    services::permission_service::{Action, Resource},
};
use axum::{
    extract::State,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

/// 汇总概览
pub async fn overview(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    AppQuery(query): AppQuery<DashboardQuery>,
) -> Result<impl IntoResponse, AppError> {
    state
        .permission_service
        .authorize(&auth_context.user, Resource::Dashboard, Action::Read)?;

    let overview = state.dashboard_service.overview(&auth_context.user, query).await?;
    Ok(Json(overview))
}

/// 资产详情
pub async fn asset_detail(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state
        .permission_service
        .authorize(&auth_context.user, Resource::Dashboard, Action::Read)?;

    let detail = state.dashboard_service.asset_detail(&auth_context.user, id).await?;
    Ok(Json(detail))
}

/// 基地汇总
pub async fn base_dashboard(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    AppPath(base): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    state
        .permission_service
        .authorize(&auth_context.user, Resource::Dashboard, Action::Read)?;

    let dashboard = state
        .dashboard_service
        .base_dashboard(&auth_context.user, &base)
        .await?;
    Ok(Json(dashboard))
}
