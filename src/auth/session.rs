//! 会话状态
//! 持有访问/刷新令牌对和预约/支付流程的暂存键，
//! 对应源系统里浏览器持久化存储的那份单实例状态

use secrecy::{ExposeSecret, Secret};
use std::collections::HashMap;
use tokio::sync::{watch, RwLock};

/// 令牌对
///
/// 两个令牌都用 `Secret` 包装，防止 Debug/日志泄露。
#[derive(Clone)]
pub struct Session {
    access_token: Secret<String>,
    refresh_token: Secret<String>,
}

impl Session {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Session {
            access_token: Secret::new(access_token.into()),
            refresh_token: Secret::new(refresh_token.into()),
        }
    }

    pub fn access_token(&self) -> &str {
        self.access_token.expose_secret()
    }

    pub fn refresh_token(&self) -> &str {
        self.refresh_token.expose_secret()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

/// 认证状态信号
///
/// 库不能做页面跳转；源系统的"跳转到登录页"在这里变成把该信号
/// 翻到 `LoggedOut`，由嵌入方订阅后自行处理。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    LoggedOut,
    LoggedIn,
}

/// 流程暂存键
///
/// 预约/支付编排过程中跨请求携带的标识，登出时必须全部清除。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScratchKey {
    /// 进行中的预约 ID
    AppointmentId,
    /// 预约价格（用于支付初始化）
    AppointmentPrice,
    /// 支付订单 ID
    PaymentOrderId,
    /// 选中的分院
    SelectedBranch,
    /// 选中的医生
    SelectedDoctor,
}

/// 进程级会话存储
///
/// 读者（附加 Bearer 头）从不被刷新阻塞；排队请求的重试在刷新
/// 提交之后重新读取令牌，而不是沿用旧值。
pub struct SessionStore {
    session: RwLock<Option<Session>>,
    scratch: RwLock<HashMap<ScratchKey, String>>,
    auth_tx: watch::Sender<AuthState>,
}

impl SessionStore {
    pub fn new() -> Self {
        let (auth_tx, _) = watch::channel(AuthState::LoggedOut);
        SessionStore {
            session: RwLock::new(None),
            scratch: RwLock::new(HashMap::new()),
            auth_tx,
        }
    }

    /// 登录/注册成功后写入会话
    pub async fn set_session(&self, session: Session) {
        *self.session.write().await = Some(session);
        self.auth_tx.send_replace(AuthState::LoggedIn);
    }

    pub async fn session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    pub async fn access_token(&self) -> Option<String> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token().to_string())
    }

    pub async fn refresh_token(&self) -> Option<String> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.refresh_token().to_string())
    }

    /// 刷新成功后替换访问令牌；服务端轮换了刷新令牌时一并替换
    pub async fn apply_refresh(&self, access_token: String, rotated_refresh: Option<String>) {
        let mut guard = self.session.write().await;
        let refresh = match (&*guard, rotated_refresh) {
            (_, Some(rotated)) => rotated,
            (Some(existing), None) => existing.refresh_token().to_string(),
            (None, None) => {
                // 刷新提交前会话已被清除（并发登出），丢弃结果
                return;
            }
        };
        *guard = Some(Session::new(access_token, refresh));
    }

    /// 登出或不可恢复的刷新失败：清会话、清暂存、发 LoggedOut 信号
    pub async fn clear(&self) {
        *self.session.write().await = None;
        self.scratch.write().await.clear();
        self.auth_tx.send_replace(AuthState::LoggedOut);
    }

    /// 订阅认证状态变化
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.auth_tx.subscribe()
    }

    pub fn auth_state(&self) -> AuthState {
        *self.auth_tx.borrow()
    }

    pub async fn put_scratch(&self, key: ScratchKey, value: impl Into<String>) {
        self.scratch.write().await.insert(key, value.into());
    }

    pub async fn get_scratch(&self, key: ScratchKey) -> Option<String> {
        self.scratch.read().await.get(&key).cloned()
    }

    pub async fn take_scratch(&self, key: ScratchKey) -> Option<String> {
        self.scratch.write().await.remove(&key)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_session_flips_auth_state() {
        let store = SessionStore::new();
        assert_eq!(store.auth_state(), AuthState::LoggedOut);

        store.set_session(Session::new("acc", "ref")).await;
        assert_eq!(store.auth_state(), AuthState::LoggedIn);
        assert_eq!(store.access_token().await.as_deref(), Some("acc"));
        assert_eq!(store.refresh_token().await.as_deref(), Some("ref"));
    }

    #[tokio::test]
    async fn test_clear_wipes_session_and_scratch() {
        let store = SessionStore::new();
        store.set_session(Session::new("acc", "ref")).await;
        store.put_scratch(ScratchKey::AppointmentId, "42").await;
        store.put_scratch(ScratchKey::PaymentOrderId, "p-7").await;

        store.clear().await;

        assert!(store.session().await.is_none());
        assert!(store.get_scratch(ScratchKey::AppointmentId).await.is_none());
        assert!(store.get_scratch(ScratchKey::PaymentOrderId).await.is_none());
        assert_eq!(store.auth_state(), AuthState::LoggedOut);
    }

    #[tokio::test]
    async fn test_apply_refresh_keeps_refresh_token() {
        let store = SessionStore::new();
        store.set_session(Session::new("old-acc", "ref")).await;

        store.apply_refresh("new-acc".to_string(), None).await;

        assert_eq!(store.access_token().await.as_deref(), Some("new-acc"));
        assert_eq!(store.refresh_token().await.as_deref(), Some("ref"));
    }

    #[tokio::test]
    async fn test_apply_refresh_rotates_refresh_token() {
        let store = SessionStore::new();
        store.set_session(Session::new("old-acc", "old-ref")).await;

        store
            .apply_refresh("new-acc".to_string(), Some("new-ref".to_string()))
            .await;

        assert_eq!(store.refresh_token().await.as_deref(), Some("new-ref"));
    }

    #[tokio::test]
    async fn test_apply_refresh_after_clear_is_noop() {
        let store = SessionStore::new();
        store.apply_refresh("acc".to_string(), None).await;
        assert!(store.session().await.is_none());
    }

    #[tokio::test]
    async fn test_subscribe_sees_logout() {
        let store = SessionStore::new();
        store.set_session(Session::new("acc", "ref")).await;
        let rx = store.subscribe();
        assert_eq!(*rx.borrow(), AuthState::LoggedIn);

        store.clear().await;
        assert_eq!(*rx.borrow(), AuthState::LoggedOut);
    }

    #[tokio::test]
    async fn test_take_scratch_removes() {
        let store = SessionStore::new();
        store.put_scratch(ScratchKey::SelectedDoctor, "d-3").await;
        assert_eq!(
            store.take_scratch(ScratchKey::SelectedDoctor).await.as_deref(),
            Some("d-3")
        );
        assert!(store.get_scratch(ScratchKey::SelectedDoctor).await.is_none());
    }

    #[test]
    fn test_session_debug_hides_tokens() {
        let session = Session::new("secret-access", "secret-refresh");
        let dbg = format!("{:?}", session);
        assert!(!dbg.contains("secret-access"));
        assert!(!dbg.contains("secret-refresh"));
    }
}
