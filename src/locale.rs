//! 多语言字段解析
//! 后端内容记录以 `field_<lang>` 后缀携带 7 种语言的文本，
//! 按请求语言 + 回退链挑选第一个非空值

use once_cell::sync::Lazy;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// 支持的语言代码
pub const SUPPORTED_LOCALES: [&str; 7] = ["uz", "ru", "en", "kaa", "tr", "kz", "tj"];

/// 各语言的回退链（不含请求语言自身和裸字段）
///
/// 卡拉卡尔帕克语优先回退乌兹别克语，突厥语系回退乌兹别克语，
/// 其余回退俄语。
static FALLBACK_CHAINS: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    let mut m: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
    m.insert("uz", &["ru"][..]);
    m.insert("ru", &["uz"][..]);
    m.insert("en", &["ru", "uz"][..]);
    m.insert("kaa", &["uz", "ru"][..]);
    m.insert("tr", &["uz", "ru"][..]);
    m.insert("kz", &["ru", "uz"][..]);
    m.insert("tj", &["ru", "uz"][..]);
    m
});

/// 判断语言代码是否受支持
pub fn is_supported(lang: &str) -> bool {
    SUPPORTED_LOCALES.contains(&lang)
}

/// 在对象字段表中解析本地化字段
///
/// 查找顺序：`field_<lang>` → 回退链中每个语言的后缀变体 → 裸 `field`。
/// null 和空字符串视为缺失，继续往下找。
pub fn localized_field<'a>(fields: &'a Map<String, Value>, field: &str, lang: &str) -> Option<&'a str> {
    let direct = format!("{}_{}", field, lang);
    if let Some(text) = non_empty_str(fields.get(&direct)) {
        return Some(text);
    }

    const DEFAULT_CHAIN: &[&str] = &["ru", "uz"];
    let chain = FALLBACK_CHAINS.get(lang).copied().unwrap_or(DEFAULT_CHAIN);
    for fallback in chain {
        if *fallback == lang {
            continue;
        }
        let key = format!("{}_{}", field, fallback);
        if let Some(text) = non_empty_str(fields.get(&key)) {
            return Some(text);
        }
    }

    non_empty_str(fields.get(field))
}

/// `localized_field` 的 `serde_json::Value` 版本
pub fn localized<'a>(record: &'a Value, field: &str, lang: &str) -> Option<&'a str> {
    record
        .as_object()
        .and_then(|fields| localized_field(fields, field, lang))
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}
