use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA_VERSION: u32 = 2;

pub fn apply_pragmas(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        ",
    )?;
    Ok(())
}

// beers(name, brewery_id) carries no UNIQUE constraint; the merge maintains it.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS breweries (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            city        TEXT,
            region      TEXT,
            website     TEXT,
            description TEXT
        );

        CREATE TABLE IF NOT EXISTS beers (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            brewery_id  INTEGER NOT NULL REFERENCES breweries(id),
            style       TEXT,
            abv         REAL,
            description TEXT
        );
        ",
    )?;
    Ok(())
}

pub fn create_indexes(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE INDEX IF NOT EXISTS idx_beers_brewery_name ON beers(brewery_id, name);
        CREATE INDEX IF NOT EXISTS idx_breweries_name     ON breweries(name);
        ",
    )?;
    Ok(())
}
