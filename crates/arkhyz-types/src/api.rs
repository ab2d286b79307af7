use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::RecordKind;

// -- Form submissions --
//
// The browser forms post camelCase fields with a `type` discriminator. The
// discriminator is read separately so an unknown kind can be reported by name.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingForm {
    #[serde(default)]
    pub booking_type: Option<String>,
    pub name: String,
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub check_in: Option<String>,
    #[serde(default)]
    pub check_out: Option<String>,
    #[serde(default)]
    pub bathhouse: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewForm {
    pub name: String,
    pub email: String,
    pub text: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentForm {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// A complete, typed form submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Submission {
    Booking(BookingForm),
    Review(ReviewForm),
    Investment(InvestmentForm),
}

impl Submission {
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Booking(_) => RecordKind::Booking,
            Self::Review(_) => RecordKind::Review,
            Self::Investment(_) => RecordKind::Investment,
        }
    }
}

/// Header carrying a client-chosen key that identifies one logical submission.
pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

// -- Response envelope --

/// The uniform `{ success, ... }` body returned by every API route.
///
/// Use the constructors; each produces exactly one of the four shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = serde_json::Value> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<T>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub fn created(id: i64) -> Self {
        Self { id: Some(id), ..Self::empty(true) }
    }

    pub fn listed(data: Vec<T>) -> Self {
        Self { data: Some(data), ..Self::empty(true) }
    }

    pub fn done(message: impl Into<String>) -> Self {
        Self { message: Some(message.into()), ..Self::empty(true) }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self { error: Some(error.into()), ..Self::empty(false) }
    }

    fn empty(success: bool) -> Self {
        Self {
            success,
            id: None,
            data: None,
            message: None,
            error: None,
        }
    }
}

// -- Liveness --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl PingResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
        }
    }
}
