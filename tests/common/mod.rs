//! 测试公共模块
//! 回环 axum 服务器 + 测试配置/令牌辅助函数

use axum::Router;
use clinic_portal_client::{ApiClient, ClientConfig, Session, SessionStore};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// 把路由挂到 127.0.0.1 随机端口上，返回基础地址
pub async fn serve(app: Router) -> (String, JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback listener");
    let addr = listener.local_addr().expect("local addr");
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });
    (format!("http://{}", addr), handle)
}

/// 测试用客户端配置：快速重试、默认 5 分钟主动刷新窗口
pub fn test_config(base_url: &str) -> ClientConfig {
    let mut config = ClientConfig::new(base_url);
    config.retry.delay_ms = 10;
    config.timeout_secs = 5;
    config
}

#[derive(Serialize)]
struct TestClaims {
    sub: String,
    exp: i64,
}

/// 签发一个测试访问令牌，`exp_offset_secs` 为相对现在的过期偏移
pub fn mint_token(exp_offset_secs: i64) -> String {
    let claims = TestClaims {
        sub: "patient-1".to_string(),
        exp: chrono::Utc::now().timestamp() + exp_offset_secs,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"test-secret"),
    )
    .expect("mint test token")
}

/// 带已登录会话的客户端
pub async fn client_with_session(config: ClientConfig, access: &str, refresh: &str) -> ApiClient {
    let store = Arc::new(SessionStore::new());
    let client = ApiClient::with_store(config, store).expect("build client");
    client.store().set_session(Session::new(access, refresh)).await;
    client
}
