use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row, params};

use arkhyz_types::RecordKind;
use arkhyz_types::models::{
    Booking, BookingUpdate, Investment, InvestmentUpdate, NewBooking, NewInvestment, NewReview,
    Review, ReviewUpdate, parse_created_at,
};

use crate::{LeadStore, SqliteStore};

impl LeadStore for SqliteStore {
    // -- Inserts --

    fn insert_booking(&self, b: &NewBooking) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO bookings
                    (type, booking_type, name, phone, email, check_in, check_out, bathhouse, message, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    RecordKind::Booking.form_type(),
                    b.booking_type,
                    b.name,
                    b.phone,
                    b.email,
                    b.check_in,
                    b.check_out,
                    b.bathhouse,
                    b.message,
                    b.timestamp,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    fn insert_review(&self, r: &NewReview) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO reviews (name, email, text, timestamp) VALUES (?1, ?2, ?3, ?4)",
                params![r.name, r.email, r.text, r.timestamp],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    fn insert_investment(&self, i: &NewInvestment) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO investments (name, phone, timestamp) VALUES (?1, ?2, ?3)",
                params![i.name, i.phone, i.timestamp],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    // -- Listings --

    fn list_bookings(&self) -> Result<Vec<Booking>> {
        self.with_conn(query_bookings)
    }

    fn list_reviews(&self) -> Result<Vec<Review>> {
        self.with_conn(query_reviews)
    }

    fn list_investments(&self) -> Result<Vec<Investment>> {
        self.with_conn(query_investments)
    }

    // -- Updates --

    fn update_booking(&self, id: i64, b: &BookingUpdate) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE bookings SET
                    booking_type = ?1, name = ?2, phone = ?3, email = ?4,
                    check_in = ?5, check_out = ?6, bathhouse = ?7, message = ?8
                 WHERE id = ?9",
                params![
                    b.booking_type,
                    b.name,
                    b.phone,
                    b.email,
                    b.check_in,
                    b.check_out,
                    b.bathhouse,
                    b.message,
                    id,
                ],
            )?;
            Ok(changed > 0)
        })
    }

    fn update_review(&self, id: i64, r: &ReviewUpdate) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE reviews SET name = ?1, email = ?2, text = ?3 WHERE id = ?4",
                params![r.name, r.email, r.text, id],
            )?;
            Ok(changed > 0)
        })
    }

    fn update_investment(&self, id: i64, i: &InvestmentUpdate) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE investments SET name = ?1, phone = ?2 WHERE id = ?3",
                params![i.name, i.phone, id],
            )?;
            Ok(changed > 0)
        })
    }

    fn delete(&self, kind: RecordKind, id: i64) -> Result<bool> {
        // Table names come from the closed RecordKind set, never from input.
        let sql = format!("DELETE FROM {} WHERE id = ?1", kind.table());
        self.with_conn(|conn| Ok(conn.execute(&sql, [id])? > 0))
    }

    fn engine(&self) -> &'static str {
        "sqlite"
    }
}

fn query_bookings(conn: &Connection) -> Result<Vec<Booking>> {
    let mut stmt = conn.prepare(
        "SELECT id, type, booking_type, name, phone, email, check_in, check_out,
                bathhouse, message, timestamp, created_at
         FROM bookings
         ORDER BY created_at DESC, id DESC",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(Booking {
                id: row.get(0)?,
                kind: row.get(1)?,
                booking_type: row.get(2)?,
                name: row.get(3)?,
                phone: row.get(4)?,
                email: row.get(5)?,
                check_in: row.get(6)?,
                check_out: row.get(7)?,
                bathhouse: row.get(8)?,
                message: row.get::<_, Option<String>>(9)?.unwrap_or_default(),
                timestamp: row.get(10)?,
                created_at: created_at(row, 11)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn query_reviews(conn: &Connection) -> Result<Vec<Review>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, email, text, timestamp, created_at
         FROM reviews
         ORDER BY created_at DESC, id DESC",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(Review {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                text: row.get(3)?,
                timestamp: row.get(4)?,
                created_at: created_at(row, 5)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn query_investments(conn: &Connection) -> Result<Vec<Investment>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, phone, timestamp, created_at
         FROM investments
         ORDER BY created_at DESC, id DESC",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(Investment {
                id: row.get(0)?,
                name: row.get(1)?,
                phone: row.get(2)?,
                timestamp: row.get(3)?,
                created_at: created_at(row, 4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn created_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_created_at(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            format!("unparseable created_at '{raw}'").into(),
        )
    })
}
