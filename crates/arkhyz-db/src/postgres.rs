use std::sync::Mutex;

use anyhow::Result;
use chrono::{DateTime, Utc};
use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use tracing::info;

use arkhyz_types::RecordKind;
use arkhyz_types::models::{
    Booking, BookingUpdate, Investment, InvestmentUpdate, NewBooking, NewInvestment, NewReview,
    Review, ReviewUpdate,
};

use crate::LeadStore;
use crate::schema::{bookings, investments, reviews};

/// Client-server PostgreSQL engine. Same contract as the SQLite engine:
/// `BIGSERIAL` ids, server-side `created_at`, newest-first listings.
pub struct PgStore {
    conn: Mutex<PgConnection>,
}

impl PgStore {
    /// Connect and create the tables if missing. Fails when the server is
    /// unreachable, which aborts startup.
    pub fn connect(database_url: &str) -> Result<Self> {
        let mut conn = PgConnection::establish(database_url)?;
        run_migrations(&mut conn)?;

        info!("PostgreSQL connection established");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut PgConnection) -> Result<T>,
    {
        let mut conn = self.conn.lock().map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))?;
        f(&mut conn)
    }
}

fn run_migrations(conn: &mut PgConnection) -> Result<()> {
    conn.batch_execute(
        "
        CREATE TABLE IF NOT EXISTS bookings (
            id            BIGSERIAL PRIMARY KEY,
            type          TEXT NOT NULL,
            booking_type  TEXT,
            name          TEXT NOT NULL,
            phone         TEXT NOT NULL,
            email         TEXT NOT NULL,
            check_in      TEXT,
            check_out     TEXT,
            bathhouse     BOOLEAN NOT NULL DEFAULT FALSE,
            message       TEXT NOT NULL DEFAULT '',
            timestamp     TEXT NOT NULL,
            created_at    TIMESTAMPTZ NOT NULL DEFAULT now()
        );

        CREATE TABLE IF NOT EXISTS reviews (
            id          BIGSERIAL PRIMARY KEY,
            name        TEXT NOT NULL,
            email       TEXT NOT NULL,
            text        TEXT NOT NULL,
            timestamp   TEXT NOT NULL,
            created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
        );

        CREATE TABLE IF NOT EXISTS investments (
            id          BIGSERIAL PRIMARY KEY,
            name        TEXT NOT NULL,
            phone       TEXT NOT NULL,
            timestamp   TEXT NOT NULL,
            created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
        );
        ",
    )?;

    info!("PostgreSQL migrations complete");
    Ok(())
}

#[derive(Queryable)]
struct BookingRow {
    id: i64,
    kind: String,
    booking_type: Option<String>,
    name: String,
    phone: String,
    email: String,
    check_in: Option<String>,
    check_out: Option<String>,
    bathhouse: bool,
    message: String,
    timestamp: String,
    created_at: DateTime<Utc>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Booking {
            id: row.id,
            kind: row.kind,
            booking_type: row.booking_type,
            name: row.name,
            phone: row.phone,
            email: row.email,
            check_in: row.check_in,
            check_out: row.check_out,
            bathhouse: row.bathhouse,
            message: row.message,
            timestamp: row.timestamp,
            created_at: row.created_at,
        }
    }
}

impl LeadStore for PgStore {
    fn insert_booking(&self, b: &NewBooking) -> Result<i64> {
        self.with_conn(|conn| {
            let id = diesel::insert_into(bookings::table)
                .values((
                    bookings::kind.eq(RecordKind::Booking.form_type()),
                    bookings::booking_type.eq(b.booking_type.as_deref()),
                    bookings::name.eq(&b.name),
                    bookings::phone.eq(&b.phone),
                    bookings::email.eq(&b.email),
                    bookings::check_in.eq(b.check_in.as_deref()),
                    bookings::check_out.eq(b.check_out.as_deref()),
                    bookings::bathhouse.eq(b.bathhouse),
                    bookings::message.eq(&b.message),
                    bookings::timestamp.eq(&b.timestamp),
                ))
                .returning(bookings::id)
                .get_result::<i64>(conn)?;
            Ok(id)
        })
    }

    fn insert_review(&self, r: &NewReview) -> Result<i64> {
        self.with_conn(|conn| {
            let id = diesel::insert_into(reviews::table)
                .values((
                    reviews::name.eq(&r.name),
                    reviews::email.eq(&r.email),
                    reviews::text.eq(&r.text),
                    reviews::timestamp.eq(&r.timestamp),
                ))
                .returning(reviews::id)
                .get_result::<i64>(conn)?;
            Ok(id)
        })
    }

    fn insert_investment(&self, i: &NewInvestment) -> Result<i64> {
        self.with_conn(|conn| {
            let id = diesel::insert_into(investments::table)
                .values((
                    investments::name.eq(&i.name),
                    investments::phone.eq(&i.phone),
                    investments::timestamp.eq(&i.timestamp),
                ))
                .returning(investments::id)
                .get_result::<i64>(conn)?;
            Ok(id)
        })
    }

    fn list_bookings(&self) -> Result<Vec<Booking>> {
        self.with_conn(|conn| {
            let rows = bookings::table
                .order((bookings::created_at.desc(), bookings::id.desc()))
                .load::<BookingRow>(conn)?;
            Ok(rows.into_iter().map(Booking::from).collect())
        })
    }

    fn list_reviews(&self) -> Result<Vec<Review>> {
        self.with_conn(|conn| {
            let rows = reviews::table
                .order((reviews::created_at.desc(), reviews::id.desc()))
                .load::<(i64, String, String, String, String, DateTime<Utc>)>(conn)?;
            Ok(rows
                .into_iter()
                .map(|(id, name, email, text, timestamp, created_at)| Review {
                    id,
                    name,
                    email,
                    text,
                    timestamp,
                    created_at,
                })
                .collect())
        })
    }

    fn list_investments(&self) -> Result<Vec<Investment>> {
        self.with_conn(|conn| {
            let rows = investments::table
                .order((investments::created_at.desc(), investments::id.desc()))
                .load::<(i64, String, String, String, DateTime<Utc>)>(conn)?;
            Ok(rows
                .into_iter()
                .map(|(id, name, phone, timestamp, created_at)| Investment {
                    id,
                    name,
                    phone,
                    timestamp,
                    created_at,
                })
                .collect())
        })
    }

    fn update_booking(&self, id: i64, b: &BookingUpdate) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = diesel::update(bookings::table.find(id))
                .set((
                    bookings::booking_type.eq(b.booking_type.as_deref()),
                    bookings::name.eq(&b.name),
                    bookings::phone.eq(&b.phone),
                    bookings::email.eq(&b.email),
                    bookings::check_in.eq(b.check_in.as_deref()),
                    bookings::check_out.eq(b.check_out.as_deref()),
                    bookings::bathhouse.eq(b.bathhouse),
                    bookings::message.eq(&b.message),
                ))
                .execute(conn)?;
            Ok(changed > 0)
        })
    }

    fn update_review(&self, id: i64, r: &ReviewUpdate) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = diesel::update(reviews::table.find(id))
                .set((
                    reviews::name.eq(&r.name),
                    reviews::email.eq(&r.email),
                    reviews::text.eq(&r.text),
                ))
                .execute(conn)?;
            Ok(changed > 0)
        })
    }

    fn update_investment(&self, id: i64, i: &InvestmentUpdate) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = diesel::update(investments::table.find(id))
                .set((investments::name.eq(&i.name), investments::phone.eq(&i.phone)))
                .execute(conn)?;
            Ok(changed > 0)
        })
    }

    fn delete(&self, kind: RecordKind, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = match kind {
                RecordKind::Booking => diesel::delete(bookings::table.find(id)).execute(conn)?,
                RecordKind::Review => diesel::delete(reviews::table.find(id)).execute(conn)?,
                RecordKind::Investment => {
                    diesel::delete(investments::table.find(id)).execute(conn)?
                }
            };
            Ok(removed > 0)
        })
    }

    fn engine(&self) -> &'static str {
        "postgres"
    }
}
