use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::Connection;

use super::migrations::run_migrations;
use super::schema::apply_pragmas;
use crate::error::Result;

/// The single SQLite handle a [`super::Database`] owns. Runs are sequential,
/// so one mutex-guarded connection covers every caller.
#[derive(Debug)]
pub(super) struct SharedConnection {
    path: Option<PathBuf>,
    conn: Mutex<Connection>,
}

impl SharedConnection {
    /// Opens the file at `path`, or a private in-memory database for `None`,
    /// then applies pragmas and pending migrations.
    pub(super) fn open(path: Option<&Path>) -> Result<Self> {
        let conn = match path {
            Some(path) => Connection::open(path)?,
            None => Connection::open_in_memory()?,
        };
        apply_pragmas(&conn)?;
        run_migrations(&conn)?;

        Ok(Self {
            path: path.map(Path::to_path_buf),
            conn: Mutex::new(conn),
        })
    }

    /// Writes only happen inside transactions, so a poisoned lock holds no
    /// partial state and is taken over as-is.
    pub(super) fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(super) fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
