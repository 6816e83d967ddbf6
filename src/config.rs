//! 配置系统
//! 从环境变量加载客户端配置，嵌入方也可以用 `ClientConfig::new` 直接构造

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// 重试策略配置
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// 可重试失败（5xx / 连接错误）的额外尝试次数
    pub max_attempts: u32,
    /// 两次尝试之间的固定延迟（毫秒）
    pub delay_ms: u64,
}

/// 认证 / 令牌刷新配置
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// 主动刷新窗口（秒）：访问令牌在该窗口内即将过期时，
    /// 后台触发一次刷新。0 表示关闭主动刷新
    pub refresh_margin_secs: u64,
    /// 刷新端点路径
    pub refresh_path: String,
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别: trace, debug, info, warn, error
    pub level: String,
    /// 日志格式: json, pretty
    pub format: String,
}

/// 客户端配置
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// 后端基础地址，例如 "https://api.clinic.example"
    pub base_url: String,
    /// 单个请求的超时时间（秒）
    pub timeout_secs: u64,
    pub retry: RetryConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

impl ClientConfig {
    /// 用默认策略构造配置（嵌入方代码路径）
    pub fn new(base_url: impl Into<String>) -> Self {
        ClientConfig {
            base_url: base_url.into(),
            timeout_secs: 30,
            retry: RetryConfig {
                max_attempts: 3,
                delay_ms: 1000,
            },
            auth: AuthConfig {
                refresh_margin_secs: 300,
                refresh_path: "/api/v1/auth/refresh/".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "json".to_string(),
            },
        }
    }

    /// 从环境变量加载配置（前缀为 PORTAL_）
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut settings = Config::builder();

        // 添加默认配置
        settings = settings
            .set_default("timeout_secs", 30)?
            .set_default("retry.max_attempts", 3)?
            .set_default("retry.delay_ms", 1000)?
            .set_default("auth.refresh_margin_secs", 300)?
            .set_default("auth.refresh_path", "/api/v1/auth/refresh/")?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?;

        settings = settings.add_source(
            Environment::with_prefix("PORTAL")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: ClientConfig = settings.build()?.try_deserialize()?;

        // 验证配置
        config.validate()?;

        Ok(config)
    }

    /// 验证配置合法性
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 验证基础地址
        match url::Url::parse(&self.base_url) {
            Ok(u) if u.scheme() == "http" || u.scheme() == "https" => {}
            Ok(u) => {
                return Err(ConfigError::Message(format!(
                    "base_url must be http(s), got scheme: {}",
                    u.scheme()
                )))
            }
            Err(e) => {
                return Err(ConfigError::Message(format!("Invalid base_url: {}", e)));
            }
        }

        // 验证重试上限
        if self.retry.max_attempts > 10 {
            return Err(ConfigError::Message(
                "retry.max_attempts must be <= 10".to_string(),
            ));
        }

        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(ConfigError::Message(
                "timeout_secs must be between 1 and 300".to_string(),
            ));
        }

        // 验证日志级别
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                )))
            }
        }

        // 验证日志格式
        match self.logging.format.to_lowercase().as_str() {
            "json" | "pretty" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log format: {}. Must be one of: json, pretty",
                    self.logging.format
                )))
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_config_defaults() {
        // 清理所有可能的环境变量
        std::env::remove_var("PORTAL_BASE_URL");
        std::env::remove_var("PORTAL_TIMEOUT_SECS");
        std::env::remove_var("PORTAL_RETRY__MAX_ATTEMPTS");
        std::env::remove_var("PORTAL_LOGGING__LEVEL");

        std::env::set_var("PORTAL_BASE_URL", "https://api.clinic.example");

        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.delay_ms, 1000);
        assert_eq!(config.auth.refresh_margin_secs, 300);
        assert_eq!(config.logging.level, "info");

        std::env::remove_var("PORTAL_BASE_URL");
    }

    #[test]
    #[serial]
    fn test_config_missing_base_url() {
        std::env::remove_var("PORTAL_BASE_URL");

        let result = ClientConfig::from_env();
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_config_validation_bad_scheme() {
        std::env::remove_var("PORTAL_BASE_URL");
        std::env::set_var("PORTAL_BASE_URL", "ftp://api.clinic.example");

        let result = ClientConfig::from_env();
        assert!(result.is_err());

        std::env::remove_var("PORTAL_BASE_URL");
    }

    #[test]
    #[serial]
    fn test_config_validation_retry_bound() {
        std::env::remove_var("PORTAL_BASE_URL");
        std::env::remove_var("PORTAL_RETRY__MAX_ATTEMPTS");
        std::env::set_var("PORTAL_BASE_URL", "https://api.clinic.example");
        std::env::set_var("PORTAL_RETRY__MAX_ATTEMPTS", "50");

        let result = ClientConfig::from_env();
        assert!(result.is_err());

        std::env::remove_var("PORTAL_BASE_URL");
        std::env::remove_var("PORTAL_RETRY__MAX_ATTEMPTS");
    }

    #[test]
    fn test_new_defaults() {
        let config = ClientConfig::new("http://127.0.0.1:9999");
        assert!(config.validate().is_ok());
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.auth.refresh_path, "/api/v1/auth/refresh/");
    }
}
