//! 访问令牌过期时间检查
//! 客户端不持有签名密钥，只解码 payload 中的 `exp`，不做任何校验

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ExpClaim {
    exp: i64,
}

/// 返回访问令牌距离过期还有多少秒（负数表示已过期）
///
/// 令牌格式不对、payload 解不开、没有 `exp` 时返回 `None`，
/// 调用方据此跳过主动刷新而不是报错。
pub fn seconds_until_expiry(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    // 有些签发方带 padding，有些不带
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: ExpClaim = serde_json::from_slice(&bytes).ok()?;
    Some(claims.exp - chrono::Utc::now().timestamp())
}
