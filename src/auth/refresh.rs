//! 单飞令牌刷新
//! 任一时刻最多一次刷新在途；并发到达的调用共享同一个结果，
//! 主动（临期）和被动（401 之后）两条触发路径都走这道门

use crate::error::ApiError;
use futures::future::{BoxFuture, FutureExt, Shared};
use serde_json::Value;
use tokio::sync::Mutex;

/// 刷新结果：新的访问令牌
pub(crate) type RefreshOutcome = Result<String, ApiError>;

type SharedRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

/// 刷新协调门
///
/// 槽位里放的是可共享的在途刷新 future，而不是裸的布尔标志加
/// 等待队列：第一个调用方安装 future，后来者克隆并等待同一个，
/// 结算后槽位清空，下一轮 401 才能再开新的刷新。
pub(crate) struct RefreshGate {
    slot: Mutex<Option<SharedRefresh>>,
}

impl RefreshGate {
    pub fn new() -> Self {
        RefreshGate {
            slot: Mutex::new(None),
        }
    }

    /// 等待在途刷新，或用 `start` 启动一次新的刷新
    ///
    /// `start` 只在槽位为空时被调用。所有等待者拿到同一份结果，
    /// 成功还是失败都是一致的，不会出现混合。
    pub async fn run<F>(&self, start: F) -> RefreshOutcome
    where
        F: FnOnce() -> BoxFuture<'static, RefreshOutcome>,
    {
        let fut = {
            let mut slot = self.slot.lock().await;
            match slot.as_ref() {
                Some(inflight) => inflight.clone(),
                None => {
                    let fresh = start().shared();
                    *slot = Some(fresh.clone());
                    fresh
                }
            }
        };

        let outcome = fut.await;

        // 结算后清槽。每个等待者都会走到这里，只清已经完成的
        // future，避免误清后续新一轮的在途刷新
        let mut slot = self.slot.lock().await;
        if let Some(inflight) = slot.as_ref() {
            if inflight.peek().is_some() {
                *slot = None;
            }
        }

        outcome
    }
}

/// 从刷新响应中提取新的访问令牌
///
/// 后端历史上用过好几种响应形状，全部容忍：
/// 顶层 `access` / `token`，或嵌套的 `data.access` / `data.token`。
pub(crate) fn extract_access(value: &Value) -> Option<String> {
    let candidates = [
        value.get("access"),
        value.get("token"),
        value.get("data").and_then(|d| d.get("access")),
        value.get("data").and_then(|d| d.get("token")),
    ];
    candidates
        .into_iter()
        .flatten()
        .find_map(Value::as_str)
        .map(str::to_string)
}

/// 提取轮换后的刷新令牌（服务端可选返回）
pub(crate) fn extract_refresh(value: &Value) -> Option<String> {
    let candidates = [
        value.get("refresh"),
        value.get("refresh_token"),
        value.get("data").and_then(|d| d.get("refresh")),
    ];
    candidates
        .into_iter()
        .flatten()
        .find_map(Value::as_str)
        .map(str::to_string)
}
