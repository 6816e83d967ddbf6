//! 统一错误模型
//! 所有失败在到达调用方之前都归一化为 `ApiError`，
//! 调用方根据 `status()` / `code()` 分支，而不是传输层异常类型

use serde_json::Value;
use thiserror::Error;

/// 客户端错误类型
///
/// `Clone` 是刷新扇出所要求的：同一次刷新失败会被广播给
/// 所有排队等待的请求。
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiError {
    /// 未收到任何 HTTP 响应（连接失败、超时等），对外状态码为 0
    #[error("Network error: {message}")]
    Connectivity { message: String },

    /// HTTP 404，软错误：不重试、不触发刷新，调用方常把它当作空状态
    #[error("Resource not found")]
    NotFound,

    /// 认证失败（401 且刷新流程已走完，或刷新本身不可行）
    /// 该错误浮出时会话已经被清除
    #[error("Authentication failed")]
    Unauthorized,

    /// HTTP >= 500，仅在有界重试耗尽后浮出
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// 其余 4xx，携带服务端提供的消息（如有）
    #[error("Request failed {status}: {message}")]
    Api {
        status: u16,
        message: String,
        code: Option<String>,
        details: Option<Value>,
    },

    /// 本地配置错误
    #[error("Configuration error: {0}")]
    Config(String),

    /// 响应体无法按预期解码
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// 获取 HTTP 状态码（本地错误类为 0）
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Connectivity { .. } => 0,
            ApiError::NotFound => 404,
            ApiError::Unauthorized => 401,
            ApiError::Server { status, .. } => *status,
            ApiError::Api { status, .. } => *status,
            ApiError::Config(_) | ApiError::Decode(_) => 0,
        }
    }

    /// 获取服务端错误码（如有）
    pub fn code(&self) -> Option<&str> {
        match self {
            ApiError::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// 是否进入通用重试循环
    ///
    /// 5xx 和连接级失败可重试；401 与 404 永远不进入该循环，
    /// 其余 4xx 立即浮出。状态 0 可重试是一个显式决定（见 DESIGN.md）。
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::Server { .. } | ApiError::Connectivity { .. }
        )
    }

    /// 根据响应状态和响应体构造归一化错误
    ///
    /// 容忍多种后端错误体：`{message}`、`{detail}`、
    /// `{error: {message, code}}`；都不匹配时退回通用消息。
    pub fn from_response(status: u16, body: &str) -> ApiError {
        match status {
            404 => ApiError::NotFound,
            401 => ApiError::Unauthorized,
            s if s >= 500 => ApiError::Server {
                status: s,
                message: extract_message(body)
                    .unwrap_or_else(|| "Internal server error".to_string()),
            },
            s => {
                let parsed: Option<Value> = serde_json::from_str(body).ok();
                let message = extract_message(body)
                    .unwrap_or_else(|| format!("Request failed with status {}", s));
                let code = parsed
                    .as_ref()
                    .and_then(|v| v.get("error"))
                    .and_then(|e| e.get("code"))
                    .and_then(|c| c.as_str())
                    .map(str::to_string);
                ApiError::Api {
                    status: s,
                    message,
                    code,
                    details: parsed,
                }
            }
        }
    }
}

/// 从错误体中提取人类可读消息
fn extract_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let candidates = [
        value.get("message"),
        value.get("detail"),
        value.get("error").and_then(|e| e.get("message")),
    ];
    let message = candidates
        .into_iter()
        .flatten()
        .find_map(|v| v.as_str())
        .map(str::to_string);
    message
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            // 没有拿到响应：连接失败、超时、请求构造失败等
            ApiError::Connectivity {
                message: e.to_string(),
            }
        }
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(e: config::ConfigError) -> Self {
        ApiError::Config(e.to_string())
    }
}

impl From<url::ParseError> for ApiError {
    fn from(e: url::ParseError) -> Self {
        ApiError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(ApiError::NotFound.status(), 404);
        assert_eq!(ApiError::Unauthorized.status(), 401);
        assert_eq!(
            ApiError::Connectivity {
                message: "timeout".to_string()
            }
            .status(),
            0
        );
        assert_eq!(
            ApiError::Server {
                status: 502,
                message: "bad gateway".to_string()
            }
            .status(),
            502
        );
    }

    #[test]
    fn test_retry_exempt_statuses() {
        // 401 与 404 永远不进入通用重试循环
        assert!(!ApiError::NotFound.is_retryable());
        assert!(!ApiError::Unauthorized.is_retryable());
        assert!(!ApiError::Api {
            status: 400,
            message: "bad".to_string(),
            code: None,
            details: None
        }
        .is_retryable());
    }

    #[test]
    fn test_connectivity_is_retryable() {
        // 状态 0 可重试（DESIGN.md 决定 1）
        let err = ApiError::Connectivity {
            message: "connection refused".to_string(),
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn test_server_error_is_retryable() {
        let err = ApiError::Server {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn test_from_response_message_shapes() {
        let e = ApiError::from_response(400, r#"{"message":"bad phone"}"#);
        assert_eq!(e.status(), 400);
        assert!(e.to_string().contains("bad phone"));

        let e = ApiError::from_response(400, r#"{"detail":"missing field"}"#);
        assert!(e.to_string().contains("missing field"));

        let e = ApiError::from_response(
            422,
            r#"{"error":{"message":"invalid date","code":"E_DATE"}}"#,
        );
        assert_eq!(e.code(), Some("E_DATE"));
        assert!(e.to_string().contains("invalid date"));
    }

    #[test]
    fn test_from_response_fallback_message() {
        let e = ApiError::from_response(400, "not json at all");
        assert!(e.to_string().contains("400"));
    }

    #[test]
    fn test_from_response_soft_404() {
        assert_eq!(ApiError::from_response(404, ""), ApiError::NotFound);
    }
}
