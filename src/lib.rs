//! 诊所门户客户端库
//! 带凭证附加、单飞令牌刷新和有界重试的后端 API SDK

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod locale;
pub mod models;
pub mod telemetry;

pub use auth::session::{AuthState, ScratchKey, Session, SessionStore};
pub use client::{ApiClient, RequestOptions};
pub use config::ClientConfig;
pub use error::ApiError;
