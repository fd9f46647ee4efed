use ai_service::{build_app, utils::logging, Config};
use anyhow::{Context, Result};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // 读取 .env（不存在时忽略）
    let _ = dotenvy::dotenv();

    // 加载配置
    let config = Config::load().context("加载配置失败")?;

    // 初始化日志
    logging::init(config.verbose_logging);
    logging::log_startup(&config);

    let app = build_app(&config).context("创建 HTTP 客户端失败")?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("无法监听 {}", config.bind_addr()))?;

    info!("✓ 服务已启动: http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("服务异常退出")?;

    info!("服务已停止");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("无法监听 Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
