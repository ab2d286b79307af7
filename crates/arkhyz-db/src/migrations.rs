use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

/// SQLite schema. `AUTOINCREMENT` keeps ids strictly increasing even after
/// the newest row is deleted.
pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS bookings (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            type          TEXT NOT NULL,
            booking_type  TEXT,
            name          TEXT NOT NULL,
            phone         TEXT NOT NULL,
            email         TEXT NOT NULL,
            check_in      TEXT,
            check_out     TEXT,
            bathhouse     INTEGER NOT NULL DEFAULT 0,
            message       TEXT NOT NULL DEFAULT '',
            timestamp     TEXT NOT NULL,
            created_at    TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS reviews (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            email       TEXT NOT NULL,
            text        TEXT NOT NULL,
            timestamp   TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS investments (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            phone       TEXT NOT NULL,
            timestamp   TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_bookings_created ON bookings(created_at);
        CREATE INDEX IF NOT EXISTS idx_reviews_created ON reviews(created_at);
        CREATE INDEX IF NOT EXISTS idx_investments_created ON investments(created_at);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
