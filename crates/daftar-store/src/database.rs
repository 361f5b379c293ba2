//! Database connection management.
//!
//! The [`Database`] struct owns a [`rusqlite::Connection`] and guarantees that
//! the schema exists and the orphan reconciler has run before any other
//! operation is possible.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use rusqlite::Connection;

use crate::error::{Result, StoreError};
use crate::{reconcile, schema};

/// Wrapper around a [`rusqlite::Connection`].
///
/// One handle, one writer: the store is designed for a single process
/// accessing the file synchronously. Concurrent external writers are
/// unsupported and would race on the ledger recorder's balance updates.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the default application database.
    ///
    /// The database file is placed in the platform-appropriate data directory:
    /// - Linux:   `~/.local/share/daftar/daftar.db`
    /// - macOS:   `~/Library/Application Support/com.daftar.daftar/daftar.db`
    /// - Windows: `{FOLDERID_RoamingAppData}\daftar\daftar\data\daftar.db`
    pub fn new() -> Result<Self> {
        let project_dirs =
            ProjectDirs::from("com", "daftar", "daftar").ok_or(StoreError::NoDataDir)?;

        let data_dir = project_dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;

        let db_path = data_dir.join("daftar.db");

        tracing::info!(path = %db_path.display(), "opening database");

        Self::open_at(&db_path)
    }

    /// Open (or create) a database at an explicit path.
    ///
    /// This is useful for tests and for embedding the store inside custom
    /// directory layouts.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.pragma_update(None, "journal_mode", "WAL")?;

        // The foreign_keys pragma stays off: referential integrity is
        // maintained by ordered cascade deletes plus the startup reconciler,
        // which must be able to observe orphans in pre-existing files in
        // order to remove them.
        schema::ensure_schema(&conn)?;
        reconcile::reconcile(&conn)?;

        Ok(Self { conn })
    }

    /// Return a reference to the underlying `rusqlite::Connection`.
    ///
    /// Callers should prefer the typed CRUD helpers, but direct access is
    /// occasionally needed for ad-hoc queries.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Return a mutable reference to the underlying connection, e.g. for
    /// transactions.
    pub fn conn_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Return the filesystem path of the open database (if any).
    pub fn path(&self) -> Option<PathBuf> {
        self.conn.path().map(PathBuf::from)
    }
}
