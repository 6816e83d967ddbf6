//! Payment gateway models (Payme / Click)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Supported external payment gateways
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProvider {
    Payme,
    Click,
}

impl std::fmt::Display for PaymentProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentProvider::Payme => write!(f, "payme"),
            PaymentProvider::Click => write!(f, "click"),
        }
    }
}

/// Payment initiation request
#[derive(Debug, Clone, Serialize)]
pub struct PaymentInitRequest {
    pub appointment_id: i64,
    /// Amount in the smallest currency unit
    pub amount: i64,
    pub provider: PaymentProvider,
}

/// Payment initiation response: where to send the user
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentInit {
    pub order_id: String,
    /// External gateway URL the embedding app redirects to
    pub payment_url: String,
}

/// A settled or pending payment in the patient's history
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentRecord {
    pub id: i64,
    pub appointment_id: Option<i64>,
    pub amount: i64,
    pub provider: Option<PaymentProvider>,
    pub status: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&PaymentProvider::Payme).unwrap(),
            "\"payme\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentProvider::Click).unwrap(),
            "\"click\""
        );
        let p: PaymentProvider = serde_json::from_str("\"click\"").unwrap();
        assert_eq!(p, PaymentProvider::Click);
    }
}
