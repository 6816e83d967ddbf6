//! Public catalog models: doctors, clinic services, branches, news, media

use crate::locale::localized_field;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Doctor profile
///
/// Localized text (full name, specialty, biography) arrives as
/// `field_<lang>` keys and stays in `extra` for locale resolution.
#[derive(Debug, Clone, Deserialize)]
pub struct Doctor {
    pub id: i64,
    pub photo: Option<String>,
    pub experience_years: Option<i32>,
    pub branch_id: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Doctor {
    pub fn full_name(&self, lang: &str) -> Option<&str> {
        localized_field(&self.extra, "full_name", lang)
    }

    pub fn specialty(&self, lang: &str) -> Option<&str> {
        localized_field(&self.extra, "specialty", lang)
    }

    pub fn biography(&self, lang: &str) -> Option<&str> {
        localized_field(&self.extra, "biography", lang)
    }
}

/// Clinic service (a billable medical service, not an HTTP one)
#[derive(Debug, Clone, Deserialize)]
pub struct ClinicService {
    pub id: i64,
    pub price: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ClinicService {
    pub fn name(&self, lang: &str) -> Option<&str> {
        localized_field(&self.extra, "name", lang)
    }

    pub fn description(&self, lang: &str) -> Option<&str> {
        localized_field(&self.extra, "description", lang)
    }
}

/// Clinic branch
#[derive(Debug, Clone, Deserialize)]
pub struct Branch {
    pub id: i64,
    pub phone: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Branch {
    pub fn address(&self, lang: &str) -> Option<&str> {
        localized_field(&self.extra, "address", lang)
    }

    pub fn name(&self, lang: &str) -> Option<&str> {
        localized_field(&self.extra, "name", lang)
    }
}

/// News article
#[derive(Debug, Clone, Deserialize)]
pub struct NewsItem {
    pub id: i64,
    pub image: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewsItem {
    pub fn title(&self, lang: &str) -> Option<&str> {
        localized_field(&self.extra, "title", lang)
    }

    pub fn body(&self, lang: &str) -> Option<&str> {
        localized_field(&self.extra, "body", lang)
    }
}

/// Media gallery entry (photo or video)
#[derive(Debug, Clone, Deserialize)]
pub struct MediaItem {
    pub id: i64,
    pub url: String,
    pub kind: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MediaItem {
    pub fn caption(&self, lang: &str) -> Option<&str> {
        localized_field(&self.extra, "caption", lang)
    }
}
