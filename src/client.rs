//! 认证 API 客户端
//! 出站调用统一在这里附加 Bearer 凭证、做主动/被动令牌刷新和有界重试

use crate::auth::jwt::seconds_until_expiry;
use crate::auth::refresh::{extract_access, extract_refresh, RefreshGate, RefreshOutcome};
use crate::auth::session::SessionStore;
use crate::config::ClientConfig;
use crate::error::ApiError;
use futures::future::{BoxFuture, FutureExt};
use reqwest::multipart::Form;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;
use url::Url;
use uuid::Uuid;

/// 单次调用的选项
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestOptions {
    /// 显式要求匿名调用：完全不带 Authorization 头（而不是带空值），
    /// 也不参与任何刷新逻辑
    pub skip_auth: bool,
}

impl RequestOptions {
    pub fn anonymous() -> Self {
        RequestOptions { skip_auth: true }
    }
}

/// 请求体
pub(crate) enum Payload {
    Empty,
    Json(Value),
    /// multipart 表单不可复用，重试时通过工厂重建；
    /// 内容类型交给传输层设置 boundary，绝不强制 JSON
    Multipart(Box<dyn Fn() -> Form + Send + Sync>),
}

/// 认证 API 客户端
///
/// 跨请求共享：`reqwest::Client` 连接池、会话存储和刷新协调门。
/// `Clone` 语义上是同一个客户端。
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    refresh_url: Url,
    config: ClientConfig,
    store: Arc<SessionStore>,
    gate: Arc<RefreshGate>,
}

impl ApiClient {
    /// 创建新的客户端
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        Self::with_store(config, Arc::new(SessionStore::new()))
    }

    /// 用外部提供的会话存储创建客户端
    pub fn with_store(config: ClientConfig, store: Arc<SessionStore>) -> Result<Self, ApiError> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        let base_url = Url::parse(&config.base_url)?;
        let refresh_url = base_url.join(&config.auth.refresh_path)?;

        Ok(ApiClient {
            http,
            base_url,
            refresh_url,
            config,
            store,
            gate: Arc::new(RefreshGate::new()),
        })
    }

    /// 会话存储句柄（登录、登出、暂存键都经过它）
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // ===== 便捷方法 =====

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(Method::GET, path, None, RequestOptions::default())
            .await
    }

    pub async fn get_with<T: DeserializeOwned>(
        &self,
        path: &str,
        opts: RequestOptions,
    ) -> Result<T, ApiError> {
        self.request(Method::GET, path, None, opts).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.request(Method::POST, path, Some(to_value(body)?), RequestOptions::default())
            .await
    }

    pub async fn post_with<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOptions,
    ) -> Result<T, ApiError> {
        self.request(Method::POST, path, Some(to_value(body)?), opts)
            .await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.request(Method::PUT, path, Some(to_value(body)?), RequestOptions::default())
            .await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.request(Method::PATCH, path, Some(to_value(body)?), RequestOptions::default())
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(Method::DELETE, path, None, RequestOptions::default())
            .await
    }

    /// multipart 请求（文件上传）
    ///
    /// 表单通过工厂闭包传入，这样 401 重试和 5xx 重试都能重建请求体。
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        make_form: impl Fn() -> Form + Send + Sync + 'static,
    ) -> Result<T, ApiError> {
        let value = self
            .dispatch(
                Method::POST,
                path,
                Payload::Multipart(Box::new(make_form)),
                RequestOptions::default(),
            )
            .await?;
        decode(value)
    }

    /// 通用入口
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        opts: RequestOptions,
    ) -> Result<T, ApiError> {
        let payload = match body {
            Some(v) => Payload::Json(v),
            None => Payload::Empty,
        };
        let value = self.dispatch(method, path, payload, opts).await?;
        decode(value)
    }

    // ===== 核心发送策略 =====

    pub(crate) async fn dispatch(
        &self,
        method: Method,
        path: &str,
        payload: Payload,
        opts: RequestOptions,
    ) -> Result<Value, ApiError> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "api_request",
            %request_id,
            method = %method,
            path,
            skip_auth = opts.skip_auth
        );
        self.dispatch_inner(method, path, payload, opts)
            .instrument(span)
            .await
    }

    async fn dispatch_inner(
        &self,
        method: Method,
        path: &str,
        payload: Payload,
        opts: RequestOptions,
    ) -> Result<Value, ApiError> {
        let url = self.base_url.join(path)?;

        // 主动刷新检查：临期令牌在后台换新，当前请求继续用旧令牌
        if !opts.skip_auth {
            self.maybe_spawn_refresh().await;
        }

        let max_attempts = self.config.retry.max_attempts;
        let delay = Duration::from_millis(self.config.retry.delay_ms);
        // 401 刷新路径的每请求重试标志，保证最多走一次
        let mut retried_after_refresh = false;
        let mut attempt: u32 = 0;

        loop {
            // 每次尝试都重新读取令牌：排队请求必须拿到刷新提交后的值
            let token = if opts.skip_auth {
                None
            } else {
                self.store.access_token().await
            };

            match self.send_once(&method, &url, &payload, token.as_deref()).await {
                Ok(value) => return Ok(value),
                Err(ApiError::Unauthorized) if !opts.skip_auth && !retried_after_refresh => {
                    retried_after_refresh = true;
                    tracing::debug!("got 401, running token refresh");
                    // 刷新失败（会话已清除）直接浮出认证错误
                    self.await_refresh().await?;
                }
                Err(err) if err.is_retryable() && attempt < max_attempts => {
                    attempt += 1;
                    metrics::counter!("portal_client_retries_total").increment(1);
                    tracing::warn!(
                        status = err.status(),
                        attempt,
                        max_attempts,
                        "retryable failure, waiting before next attempt"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    tracing::debug!(status = err.status(), error = %err, "request failed");
                    return Err(err);
                }
            }
        }
    }

    /// 发送一次请求并归一化结果
    async fn send_once(
        &self,
        method: &Method,
        url: &Url,
        payload: &Payload,
        token: Option<&str>,
    ) -> Result<Value, ApiError> {
        let mut req = self.http.request(method.clone(), url.clone());

        if let Some(token) = token {
            req = req.bearer_auth(token);
        }

        req = match payload {
            Payload::Empty => req,
            Payload::Json(v) => req.json(v),
            Payload::Multipart(make_form) => req.multipart(make_form()),
        };

        let resp = req.send().await?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        if (200..300).contains(&status) {
            if body.trim().is_empty() {
                return Ok(Value::Null);
            }
            serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
        } else {
            Err(ApiError::from_response(status, &body))
        }
    }

    // ===== 刷新协调 =====

    /// 被动刷新：401 之后等待（或启动）单飞刷新
    async fn await_refresh(&self) -> Result<(), ApiError> {
        let fut = self.refresh_future();
        self.gate.run(move || fut).await.map(|_| ())
    }

    /// 主动刷新：令牌在窗口内即将过期（但尚未过期）时后台换新
    async fn maybe_spawn_refresh(&self) {
        let margin = self.config.auth.refresh_margin_secs as i64;
        if margin == 0 {
            return;
        }
        let Some(token) = self.store.access_token().await else {
            return;
        };
        match seconds_until_expiry(&token) {
            Some(secs) if secs > 0 && secs <= margin => {
                let gate = self.gate.clone();
                let fut = self.refresh_future();
                tokio::spawn(async move {
                    if let Err(err) = gate.run(move || fut).await {
                        tracing::debug!(error = %err, "background token refresh failed");
                    }
                });
            }
            // 已过期的令牌交给 401 路径处理；解不开的令牌不做主动刷新
            _ => {}
        }
    }

    /// 构造实际的刷新调用
    ///
    /// 在单飞门的槽位里运行，所以自身不需要再做互斥。
    /// 任何失败都清除会话并归一化为认证错误（见 DESIGN.md 决定 4）。
    fn refresh_future(&self) -> BoxFuture<'static, RefreshOutcome> {
        let http = self.http.clone();
        let url = self.refresh_url.clone();
        let store = self.store.clone();

        async move {
            let Some(refresh_token) = store.refresh_token().await else {
                // 没有刷新令牌可用：直接登出
                store.clear().await;
                return Err(ApiError::Unauthorized);
            };

            let body = serde_json::json!({ "refresh": refresh_token });

            // 刷新调用不携带 Authorization 头
            let result: Result<Value, ApiError> = async {
                let resp = http.post(url).json(&body).send().await?;
                let status = resp.status().as_u16();
                let text = resp
                    .text()
                    .await
                    .map_err(|e| ApiError::Decode(e.to_string()))?;
                if (200..300).contains(&status) {
                    serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
                } else {
                    Err(ApiError::from_response(status, &text))
                }
            }
            .await;

            match result {
                Ok(value) => match extract_access(&value) {
                    Some(access) => {
                        let rotated = extract_refresh(&value);
                        store.apply_refresh(access.clone(), rotated).await;
                        metrics::counter!("portal_client_refreshes_total").increment(1);
                        tracing::debug!("access token refreshed");
                        Ok(access)
                    }
                    None => {
                        store.clear().await;
                        tracing::warn!("refresh response carried no usable token, session cleared");
                        Err(ApiError::Unauthorized)
                    }
                },
                Err(err) => {
                    metrics::counter!("portal_client_refresh_failures_total").increment(1);
                    tracing::warn!(error = %err, "token refresh failed, session cleared");
                    store.clear().await;
                    Err(ApiError::Unauthorized)
                }
            }
        }
        .boxed()
    }
}

fn to_value<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}
