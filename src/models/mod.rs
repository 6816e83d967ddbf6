//! 数据模型模块
//! 后端各业务域的 DTO；本地化文本字段留在 `extra` 平铺表里，
//! 由 `crate::locale` 按语言解析

pub mod appointment;
pub mod auth;
pub mod catalog;
pub mod patient;
pub mod payment;

use crate::error::ApiError;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// 解析列表响应
///
/// 后端一部分端点返回裸数组，另一部分返回分页包装 `{results: [...]}`，
/// 两种都接受。
pub(crate) fn decode_list<T: DeserializeOwned>(value: Value) -> Result<Vec<T>, ApiError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("results") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(ApiError::Decode(
                    "expected a list or a paginated {results} object".to_string(),
                ))
            }
        },
        other => {
            return Err(ApiError::Decode(format!(
                "expected a list response, got: {}",
                other
            )))
        }
    };

    items
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(|e| ApiError::Decode(e.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_bare_list() {
        let items: Vec<i64> = decode_list(json!([1, 2, 3])).unwrap();
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[test]
    fn test_decode_paginated_list() {
        let items: Vec<i64> = decode_list(json!({"count": 3, "results": [1, 2, 3]})).unwrap();
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[test]
    fn test_decode_list_rejects_scalar() {
        let result: Result<Vec<i64>, _> = decode_list(json!(42));
        assert!(result.is_err());
    }
}
