//! 登录 / 注册 / 登出

use crate::auth::refresh::{extract_access, extract_refresh};
use crate::auth::session::Session;
use crate::client::{ApiClient, RequestOptions};
use crate::error::ApiError;
use crate::models::auth::{LoginRequest, RegisterRequest, UserSummary};
use serde_json::Value;

impl ApiClient {
    /// 登录并写入会话
    pub async fn login(&self, request: &LoginRequest) -> Result<Option<UserSummary>, ApiError> {
        let value: Value = self
            .post_with("/api/v1/auth/login/", request, RequestOptions::anonymous())
            .await?;
        self.adopt_tokens(&value).await?;
        Ok(extract_user(&value))
    }

    /// 注册新患者并写入会话
    pub async fn register(&self, request: &RegisterRequest) -> Result<Option<UserSummary>, ApiError> {
        let value: Value = self
            .post_with("/api/v1/auth/register/", request, RequestOptions::anonymous())
            .await?;
        self.adopt_tokens(&value).await?;
        Ok(extract_user(&value))
    }

    /// 当前登录用户
    pub async fn me(&self) -> Result<UserSummary, ApiError> {
        self.get("/api/v1/auth/me/").await
    }

    /// 登出
    ///
    /// 服务端通知是尽力而为；本地会话和流程暂存无条件清除。
    pub async fn logout(&self) -> Result<(), ApiError> {
        let result: Result<Value, ApiError> =
            self.post("/api/v1/auth/logout/", &serde_json::json!({})).await;
        if let Err(err) = result {
            tracing::warn!(error = %err, "server-side logout failed, clearing local session anyway");
        }
        self.store().clear().await;
        Ok(())
    }

    /// 从登录/注册响应中提取令牌对并落库
    async fn adopt_tokens(&self, value: &Value) -> Result<(), ApiError> {
        let access = extract_access(value).ok_or_else(|| {
            ApiError::Decode("auth response carried no access token".to_string())
        })?;
        let refresh = extract_refresh(value).ok_or_else(|| {
            ApiError::Decode("auth response carried no refresh token".to_string())
        })?;
        self.store().set_session(Session::new(access, refresh)).await;
        Ok(())
    }
}

fn extract_user(value: &Value) -> Option<UserSummary> {
    value
        .get("user")
        .or_else(|| value.get("data").and_then(|d| d.get("user")))
        .cloned()
        .and_then(|u| serde_json::from_value(u).ok())
}
