//! Authentication-related models

use serde::{Deserialize, Serialize};

/// Login request
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub phone: String,
    pub password: String,
}

/// Registration request
#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub password: String,
}

/// Authenticated user summary returned alongside tokens
#[derive(Debug, Clone, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}
