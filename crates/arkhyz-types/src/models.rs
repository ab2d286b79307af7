use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The three independent submission categories. Each maps to its own table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Booking,
    Review,
    Investment,
}

impl RecordKind {
    pub const ALL: [RecordKind; 3] = [Self::Booking, Self::Review, Self::Investment];

    /// Discriminator used in the `type` field of a form submission.
    pub fn form_type(self) -> &'static str {
        match self {
            Self::Booking => "booking",
            Self::Review => "review",
            Self::Investment => "investment",
        }
    }

    /// Path segment used by the admin routes (`/api/{collection}/{id}`).
    pub fn collection(self) -> &'static str {
        match self {
            Self::Booking => "bookings",
            Self::Review => "reviews",
            Self::Investment => "investments",
        }
    }

    /// Table names match the collection segments.
    pub fn table(self) -> &'static str {
        self.collection()
    }

    pub fn from_form_type(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.form_type() == value)
    }

    pub fn from_collection(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.collection() == value)
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.form_type())
    }
}

// -- Stored records --
//
// Field names follow the table columns, which is also the shape the admin
// page reads and writes back.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    /// Always `"booking"`.
    #[serde(rename = "type")]
    pub kind: String,
    pub booking_type: Option<String>,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub bathhouse: bool,
    pub message: String,
    /// Client-supplied submission time (ISO-8601, stored verbatim).
    pub timestamp: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub text: String,
    pub timestamp: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investment {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub timestamp: String,
    pub created_at: DateTime<Utc>,
}

// -- Insert field sets --

#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub booking_type: Option<String>,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub bathhouse: bool,
    pub message: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub name: String,
    pub email: String,
    pub text: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewInvestment {
    pub name: String,
    pub phone: String,
    pub timestamp: String,
}

// -- Update field sets (full replacement of the editable columns) --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingUpdate {
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
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewUpdate {
    pub name: String,
    pub email: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentUpdate {
    pub name: String,
    pub phone: String,
}

/// Parse a `created_at` column value into UTC.
///
/// SQLite's `datetime('now')` yields `YYYY-MM-DD HH:MM:SS` with no zone, which
/// is UTC by definition; anything RFC 3339 is accepted as well.
pub fn parse_created_at(raw: &str) -> Option<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>().ok().or_else(|| {
        chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
            .map(|ndt| ndt.and_utc())
            .ok()
    })
}
