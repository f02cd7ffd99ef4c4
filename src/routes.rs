//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
};

use crate::{handlers, middleware::AppState};

/// 请求体大小上限
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    // 公开端点（健康检查）
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check));

    // 登录（无需认证，但应用限流）
    let login_routes = Router::new()
        .route("/api/auth/login", post(handlers::auth::login))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::login_rate_limit_middleware,
        ));

    // 需要认证的路由
    let authenticated_routes = Router::new()
        // 认证与当前用户
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/logout-all", post(handlers::auth::logout_all))
        .route("/api/auth/me", get(handlers::auth::me))
        .route("/api/auth/change-password", put(handlers::auth::change_password))

        // 仪表盘
        .route("/api/dashboard", get(handlers::dashboard::overview))
        .route("/api/dashboard/asset/{id}", get(handlers::dashboard::asset_detail))
        .route("/api/dashboard/base/{base}", get(handlers::dashboard::base_dashboard))

        // 资产
        .route(
            "/api/assets",
            get(handlers::asset::list_assets).post(handlers::asset::create_asset),
        )
        .route(
            "/api/assets/{id}",
            get(handlers::asset::get_asset).put(handlers::asset::update_asset),
        )

        // 调拨
        .route(
            "/api/transfers",
            get(handlers::transfer::list_transfers).post(handlers::transfer::create_transfer),
        )
        .route("/api/transfers/{id}", get(handlers::transfer::get_transfer))
        .route(
            "/api/transfers/{id}/status",
            put(handlers::transfer::update_transfer_status),
        )

        // 采购
        .route(
            "/api/purchases",
            get(handlers::purchase::list_purchases).post(handlers::purchase::create_purchase),
        )
        .route("/api/purchases/{id}", get(handlers::purchase::get_purchase))
        .route(
            "/api/purchases/{id}/status",
            put(handlers::purchase::update_purchase_status),
        )

        // 分配
        .route(
            "/api/assignments",
            get(handlers::assignment::list_assignments)
                .post(handlers::assignment::create_assignment),
        )
        .route("/api/assignments/{id}", get(handlers::assignment::get_assignment))
        .route(
            "/api/assignments/{id}/status",
            put(handlers::assignment::update_assignment_status),
        )

        // 消耗
        .route(
            "/api/expenditures",
            get(handlers::expenditure::list_expenditures)
                .post(handlers::expenditure::create_expenditure),
        )
        .route("/api/expenditures/{id}", get(handlers::expenditure::get_expenditure))

        // 用户管理
        .route("/api/users", get(handlers::user::list_users))
        .route(
            "/api/users/{id}",
            get(handlers::user::get_user).put(handlers::user::update_user),
        )

        // 操作日志
        .route("/api/activity-logs", get(handlers::activity::list_activity_logs))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::auth::middleware::session_auth_middleware,
        ));

    // 组合所有路由
    Router::new()
        .merge(public_routes)
        .merge(login_routes)
        .merge(authenticated_routes)
        .layer(cors_layer(&state.config.security.cors_allowed_origins))
        .layer(CompressionLayer::new())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(axum::middleware::from_fn(crate::middleware::request_tracking_middleware))
        .with_state(state)
}

/// 未配置来源时允许任意来源
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}
