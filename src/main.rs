//! 军用资产管理服务主入口

use mams_service::{
    config::AppConfig, db, error, handlers::health, middleware::AppState, routes, telemetry,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "--version" => {
                println!("mams-service {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[1]);
                print_help();
                std::process::exit(1);
            }
        }
    }

    // 按优先级加载：.env.local > .env.development > .env
    // 生产环境应该直接设置环境变量
    if let Ok(env) = std::env::var("MAMS_ENV") {
        dotenv::from_filename(format!(".env.{}", env)).ok();
    } else {
        dotenv::from_filename(".env.local").ok();
        dotenv::from_filename(".env.development").ok();
        dotenv::dotenv().ok();
    }

    health::set_start_time();

    // 1. 加载配置
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        anyhow::anyhow!("Failed to load configuration: {}", e)
    })?;

    // 2. 初始化日志
    telemetry::init_telemetry(&config);
    error::set_expose_internal_errors(config.server.is_development());

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "MAMS service starting");

    // 3. 数据库连接池 + 迁移
    let db_pool = db::create_pool(&config.database).await?;
    db::run_migrations(&db_pool).await?;

    // 4. 构建应用状态
    let app_state = Arc::new(AppState::new(config.clone(), db_pool));

    if let Some(admin) = app_state
        .auth_service
        .bootstrap_admin(&config.bootstrap)
        .await?
    {
        tracing::info!(username = %admin.username, "Seeded initial administrator");
    }

    let cleanup_handle = spawn_cleanup_task(
        app_state.clone(),
        Duration::from_secs(config.security.session_cleanup_interval_secs),
    );

    // 5. 构建路由
    let app = routes::create_router(app_state);

    // 6. 启动服务器
    let addr = &config.server.addr;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(addr = %addr, "Server listening");

    // 7. 优雅关闭
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal(config.server.graceful_shutdown_timeout_secs))
        .await?;

    cleanup_handle.abort();
    tracing::info!("Server shutdown complete");
    Ok(())
}

/// 定期清理过期会话与空闲限流记录
fn spawn_cleanup_task(state: Arc<AppState>, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            if let Err(e) = state.auth_service.cleanup_expired_sessions().await {
                tracing::warn!(error = %e, "Expired session cleanup failed");
            }

            let pruned = state.login_limiter.prune();
            if pruned > 0 {
                tracing::debug!(pruned, "Idle rate limiter entries removed");
            }
        }
    })
}

/// 优雅关闭信号处理
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C received, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Terminate signal received, starting graceful shutdown");
        },
    }

    // 超时后强制退出
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(timeout_secs)).await;
        tracing::warn!("Graceful shutdown timeout reached, forcing exit");
        std::process::exit(1);
    });
}

fn print_help() {
    println!("mams-service {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: mams-service [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --version     Print version and exit");
    println!("  --help        Print this help and exit");
    println!();
    println!("Environment:");
    println!("  All configuration comes from MAMS_* environment variables");
    println!("  (nested keys use '__', e.g. MAMS_DATABASE__URL)");
}
