//! Appointment booking models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Create appointment request
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentRequest {
    pub doctor_id: i64,
    pub branch_id: i64,
    pub service_id: i64,
    /// Visit date, `YYYY-MM-DD`
    pub date: NaiveDate,
    /// Visit time, `HH:MM`
    pub time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Appointment as returned by the backend
#[derive(Debug, Clone, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub doctor_id: Option<i64>,
    pub branch_id: Option<i64>,
    pub service_id: Option<i64>,
    pub status: Option<String>,
    /// Price in the smallest currency unit
    pub price: Option<i64>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// One bookable slot from the availability endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilitySlot {
    pub time: String,
    pub available: bool,
}
