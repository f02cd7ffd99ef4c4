//! HTTP 中间件
//! 请求追踪、登录限流、客户端信息提取

use crate::{error::AppError, models::auth::ClientInfo};
use axum::{
    extract::{ConnectInfo, FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;
use std::collections::VecDeque;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::Instrument;
use uuid::Uuid;

/// 应用状态
///
/// 服务使用 Arc 包装，Clone 只是指针拷贝
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::AppConfig,
    pub db: sqlx::PgPool,
    pub auth_service: Arc<crate::services::AuthService>,
    pub user_service: Arc<crate::services::UserService>,
    pub permission_service: Arc<crate::services::PermissionService>,
    pub activity_service: Arc<crate::services::ActivityService>,
    pub dashboard_service: Arc<crate::services::DashboardService>,
    /// 登录接口 IP 限流器
    pub login_limiter: Arc<IpRateLimiter>,
}

impl AppState {
    /// 根据配置组装所有服务
    pub fn new(config: crate::config::AppConfig, db: sqlx::PgPool) -> Self {
        let activity_service = Arc::new(crate::services::ActivityService::new(db.clone()));
        let permission_service =
            crate::services::PermissionService::new(config.security.logistics_officer_base_scoped);

        Self {
            auth_service: Arc::new(crate::services::AuthService::new(
                db.clone(),
                config.security.clone(),
                activity_service.clone(),
            )),
            user_service: Arc::new(crate::services::UserService::new(
                db.clone(),
                activity_service.clone(),
            )),
            dashboard_service: Arc::new(crate::services::DashboardService::new(
                db.clone(),
                permission_service,
            )),
            permission_service: Arc::new(permission_service),
            activity_service,
            login_limiter: Arc::new(IpRateLimiter::new(
                config.security.login_max_attempts as usize,
                Duration::from_secs(config.security.login_window_secs as u64),
            )),
            config,
            db,
        }
    }
}

/// 请求追踪中间件
/// 为每个请求生成 trace_id 和 request_id，并记录指标
pub async fn request_tracking_middleware(req: Request, next: Next) -> Response {
    let trace_id = extract_or_generate_trace_id(req.headers());
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let span = tracing::info_span!(
        "http_request",
        trace_id = %trace_id,
        request_id = %request_id,
        method = %method,
        path = %path,
        user_id = tracing::field::Empty,
    );

    async move {
        let start = Instant::now();
        let mut response = next.run(req).await;
        let elapsed = start.elapsed();

        let status = response.status().as_u16();
        let method_name = match method.as_str() {
            "GET" => "GET",
            "POST" => "POST",
            "PUT" => "PUT",
            "DELETE" => "DELETE",
            "PATCH" => "PATCH",
            _ => "OTHER",
        };
        let status_class = match status {
            200..=299 => "2xx",
            300..=399 => "3xx",
            400..=499 => "4xx",
            _ => "5xx",
        };

        metrics::counter!("http_requests_total", "method" => method_name, "status" => status_class)
            .increment(1);
        metrics::histogram!("http_request_duration_seconds").record(elapsed.as_secs_f64());

        tracing::info!(
            status = status,
            elapsed_ms = elapsed.as_millis() as u64,
            "Request completed"
        );

        if let Ok(value) = HeaderValue::from_str(&trace_id) {
            response.headers_mut().insert("x-trace-id", value);
        }
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert("x-request-id", value);
        }

        response
    }
    .instrument(span)
    .await
}

/// 从请求头中提取或生成 trace_id
fn extract_or_generate_trace_id(headers: &HeaderMap) -> String {
    headers
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty() && s.len() <= 128)
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// 登录限流中间件
pub async fn login_rate_limit_middleware(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let client_ip = resolve_client_ip(req.headers(), req.extensions(), state.config.security.trust_proxy)
        .unwrap_or(IpAddr::V4(std::net::Ipv4Addr::LOCALHOST));

    if !state.login_limiter.check(client_ip) {
        metrics::counter!("auth_login_rate_limited_total").increment(1);
        tracing::warn!(client_ip = %client_ip, "Login rate limit exceeded");
        return Err(AppError::RateLimitExceeded);
    }

    Ok(next.run(req).await)
}

/// 获取客户端 IP 地址
/// 信任代理时优先使用代理头，否则使用连接地址
fn resolve_client_ip(
    headers: &HeaderMap,
    extensions: &axum::http::Extensions,
    trust_proxy: bool,
) -> Option<IpAddr> {
    if trust_proxy {
        // 取 X-Forwarded-For 最右侧一跳，即可信代理实际看到的对端地址；
        // 左侧条目由客户端自行填写
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.rsplit(',').next())
            .and_then(|ip| ip.trim().parse::<IpAddr>().ok());
        if forwarded.is_some() {
            return forwarded;
        }

        let real_ip = headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|ip| ip.trim().parse::<IpAddr>().ok());
        if real_ip.is_some() {
            return real_ip;
        }
    }

    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
}

// 处理器中直接提取客户端信息，用于会话与操作日志
impl FromRequestParts<Arc<AppState>> for ClientInfo {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let ip_address = resolve_client_ip(&parts.headers, &parts.extensions, state.config.security.trust_proxy)
            .map(|ip| ip.to_string());
        let user_agent = parts
            .headers
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.chars().take(512).collect());

        Ok(ClientInfo {
            ip_address,
            user_agent,
        })
    }
}

// ==================== 限流服务 ====================

/// IP 级别的速率限制器，滑动窗口算法
pub struct IpRateLimiter {
    windows: DashMap<IpAddr, Mutex<VecDeque<Instant>>>,
    max_requests: usize,
    window: Duration,
}

impl IpRateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            max_requests,
            window,
        }
    }

    /// 检查并记录一次请求，超过限制返回 false
    pub fn check(&self, ip: IpAddr) -> bool {
        self.check_at(ip, Instant::now())
    }

    fn check_at(&self, ip: IpAddr, now: Instant) -> bool {
        let entry = self.windows.entry(ip).or_insert_with(|| Mutex::new(VecDeque::new()));
        let mut requests = entry.lock().unwrap_or_else(|e| e.into_inner());

        while let Some(&front) = requests.front() {
            if now.duration_since(front) < self.window {
                break;
            }
            requests.pop_front();
        }

        if requests.len() < self.max_requests {
            requests.push_back(now);
            true
        } else {
            false
        }
    }

    /// 清理窗口内已无请求的 IP
    pub fn prune(&self) -> usize {
        let now = Instant::now();
        let before = self.windows.len();
        self.windows.retain(|_, requests| {
            let requests = requests.get_mut().unwrap_or_else(|e| e.into_inner());
            requests
                .back()
                .is_some_and(|&last| now.duration_since(last) < self.window)
        });
        before - self.windows.len()
    }
}
