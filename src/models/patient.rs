//! Patient dashboard models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Patient profile
#[derive(Debug, Clone, Deserialize)]
pub struct PatientProfile {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<String>,
    pub avatar: Option<String>,
}

/// Profile update request (all fields optional)
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
}

/// A submitted application (contact / callback form)
#[derive(Debug, Clone, Deserialize)]
pub struct Application {
    pub id: i64,
    pub subject: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// A saved interest (bookmarked doctor or service)
#[derive(Debug, Clone, Deserialize)]
pub struct Interest {
    pub id: i64,
    pub kind: Option<String>,
    pub target_id: Option<i64>,
}
