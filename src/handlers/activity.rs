//! 操作日志查询处理器

use crate::{
    auth::middleware::AuthContext,
    error::AppError,
    extract::AppQuery,
    middleware::AppState,
    models::{
        activity::{ActivityLogFilters, ActivityLogQuery},
        filter::{DateRange, Pagination, DEFAULT_PAGE_SIZE},
    },
    services::permission_service::{Action, Resource},
};
use axum::{
    extract::State,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// 查询操作日志
pub async fn list_activity_logs(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    AppQuery(query): AppQuery<ActivityLogQuery>,
) -> Result<impl IntoResponse, AppError> {
    state
        .permission_service
        .authorize(&auth_context.user, Resource::ActivityLog, Action::Read)?;

    let filters = ActivityLogFilters {
        user_id: query.user_id,
        action: query.action,
        resource_type: query.resource_type.filter(|r| !r.trim().is_empty()),
        range: DateRange::parse(query.start_date.as_deref(), query.end_date.as_deref())
            .map_err(AppError::Validation)?,
    };
    let page = Pagination {
        limit: query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        offset: query.offset.unwrap_or(0),
    }
    .normalized();

    let logs = state
        .activity_service
        .query(&filters, page.limit, page.offset)
        .await?;
    let total = state.activity_service.count(&filters).await?;

    Ok(Json(json!({
        "logs": logs,
        "total": total,
        "limit": page.limit,
        "offset": page.offset
    })))
}
