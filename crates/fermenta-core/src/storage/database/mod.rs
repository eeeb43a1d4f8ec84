mod connection;
mod migrations;
mod schema;

use connection::SharedConnection;
pub use schema::SCHEMA_VERSION;

use std::path::Path;
use std::sync::MutexGuard;

use rusqlite::Connection;
use tracing::warn;

use crate::error::{FermentaError, Result};
use crate::models::{Beer, Brewery, NewBeer, NewBrewery};

use super::repositories::{
    BeerRepository, BreweryRepository, Repository, SqliteBeerRepository, SqliteBreweryRepository,
};

/// Entry point to the brewery database. Every method takes the connection
/// lock for its duration; [`Database::transaction`] holds it for the whole
/// closure.
#[derive(Debug)]
pub struct Database {
    conn: SharedConnection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            conn: SharedConnection::open(Some(path))?,
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: SharedConnection::open(None)?,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.conn.path()
    }

    pub(crate) fn connection(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock()
    }

    /// Runs `f` inside a single transaction. Commits when `f` returns `Ok`;
    /// a failed commit comes back as [`FermentaError::Commit`]. Rolls back
    /// when `f` returns `Err` and hands that error back unchanged.
    pub fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        match f(&tx) {
            Ok(value) => {
                tx.commit().map_err(FermentaError::Commit)?;
                Ok(value)
            }
            Err(e) => {
                // RAISE(ROLLBACK), SQLITE_FULL and some I/O errors end the
                // transaction inside SQLite before `f` returns.
                if !tx.is_autocommit() {
                    if let Err(rollback) = tx.rollback() {
                        warn!(error = %rollback, "rollback failed");
                    }
                }
                Err(e)
            }
        }
    }

    pub fn applied_migrations(&self) -> Result<Vec<u32>> {
        let conn = self.conn.lock();
        migrations::get_applied_versions(&conn)
    }

    // ─── Breweries ─────────────────────────────────────────

    pub fn list_breweries(&self) -> Result<Vec<Brewery>> {
        let conn = self.conn.lock();
        SqliteBreweryRepository::new(&conn).list_all()
    }

    pub fn find_brewery(&self, id: i64) -> Result<Option<Brewery>> {
        let conn = self.conn.lock();
        SqliteBreweryRepository::new(&conn).find_by_id(&id)
    }

    pub fn insert_brewery(&self, brewery: &NewBrewery) -> Result<i64> {
        let conn = self.conn.lock();
        SqliteBreweryRepository::new(&conn).insert(brewery)
    }

    pub fn count_breweries(&self) -> Result<usize> {
        let conn = self.conn.lock();
        SqliteBreweryRepository::new(&conn).count()
    }

    // ─── Beers ─────────────────────────────────────────────

    pub fn find_beer(&self, id: i64) -> Result<Option<Beer>> {
        let conn = self.conn.lock();
        SqliteBeerRepository::new(&conn).find_by_id(&id)
    }

    pub fn list_beers_by_brewery(&self, brewery_id: i64) -> Result<Vec<Beer>> {
        let conn = self.conn.lock();
        SqliteBeerRepository::new(&conn).list_by_brewery(brewery_id)
    }

    pub fn find_beers_by_name(&self, name: &str) -> Result<Vec<Beer>> {
        let conn = self.conn.lock();
        SqliteBeerRepository::new(&conn).find_by_name(name)
    }

    pub fn insert_beer(&self, beer: &NewBeer) -> Result<i64> {
        let conn = self.conn.lock();
        SqliteBeerRepository::new(&conn).insert(beer)
    }

    pub fn count_beers(&self) -> Result<usize> {
        let conn = self.conn.lock();
        SqliteBeerRepository::new(&conn).count()
    }

    pub fn count_orphan_beers(&self) -> Result<usize> {
        let conn = self.conn.lock();
        SqliteBeerRepository::new(&conn).count_orphans()
    }
}
