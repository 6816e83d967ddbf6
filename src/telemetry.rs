//! 日志与追踪系统
//! 嵌入方在进程入口调用一次；库内部只通过 `tracing` 宏记录

use crate::config::ClientConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// 初始化日志与追踪系统
///
/// 已经装配过全局 subscriber 时静默跳过，方便测试环境重复调用。
pub fn init_telemetry(config: &ClientConfig) {
    // 从环境变量构建过滤器
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    // 根据配置选择日志格式
    let log_layer = match config.logging.format.to_lowercase().as_str() {
        "json" => {
            // JSON 格式（生产环境）
            tracing_subscriber::fmt::layer()
                .json()
                .with_target(false)
                .boxed()
        }
        "pretty" => {
            // 美化格式（开发环境）
            tracing_subscriber::fmt::layer()
                .pretty()
                .with_target(false)
                .boxed()
        }
        _ => tracing_subscriber::fmt::layer().with_target(false).boxed(),
    };

    let result = tracing_subscriber::registry()
        .with(env_filter)
        .with(log_layer)
        .try_init();

    if result.is_ok() {
        tracing::info!(
            version = env!("CARGO_PKG_VERSION"),
            level = %config.logging.level,
            format = %config.logging.format,
            "Telemetry initialized"
        );
    }
}

/// 初始化指标收集器
pub fn init_metrics() {
    // metrics 0.24 不再需要显式注册指标，首次使用时自动创建
    tracing::debug!("Metrics initialized");
}
