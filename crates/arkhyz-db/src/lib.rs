pub mod migrations;
pub mod queries;
pub mod sqlite;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "postgres")]
mod schema;

use anyhow::Result;

use arkhyz_types::RecordKind;
use arkhyz_types::models::{
    Booking, BookingUpdate, Investment, InvestmentUpdate, NewBooking, NewInvestment, NewReview,
    Review, ReviewUpdate,
};

pub use sqlite::SqliteStore;
#[cfg(feature = "postgres")]
pub use postgres::PgStore;

/// Table-backed storage for the three record kinds.
///
/// Methods block on the underlying engine; async callers run them through
/// `tokio::task::spawn_blocking`. Listings are ordered newest first
/// (`created_at DESC, id DESC`). `update_*` and `delete` return `false` when no
/// row has the given id.
pub trait LeadStore: Send + Sync {
    fn insert_booking(&self, booking: &NewBooking) -> Result<i64>;
    fn insert_review(&self, review: &NewReview) -> Result<i64>;
    fn insert_investment(&self, investment: &NewInvestment) -> Result<i64>;

    fn list_bookings(&self) -> Result<Vec<Booking>>;
    fn list_reviews(&self) -> Result<Vec<Review>>;
    fn list_investments(&self) -> Result<Vec<Investment>>;

    fn update_booking(&self, id: i64, fields: &BookingUpdate) -> Result<bool>;
    fn update_review(&self, id: i64, fields: &ReviewUpdate) -> Result<bool>;
    fn update_investment(&self, id: i64, fields: &InvestmentUpdate) -> Result<bool>;

    fn delete(&self, kind: RecordKind, id: i64) -> Result<bool>;

    /// Short engine name for logs.
    fn engine(&self) -> &'static str;
}
