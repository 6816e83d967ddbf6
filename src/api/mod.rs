//! 类型化端点封装
//! 每个后端业务域一个子模块；全部是对 `ApiClient` 核心策略的
//! 薄透传，认证/刷新/重试契约都在 `crate::client` 里

pub mod appointments;
pub mod auth;
pub mod catalog;
pub mod patient;
pub mod payments;
