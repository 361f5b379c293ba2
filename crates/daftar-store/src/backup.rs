//! Whole-file backup and restore.
//!
//! Both operations copy the persisted store byte-for-byte and report success
//! as a plain boolean; failures are logged, and there is no partial-state
//! recovery if a copy is interrupted mid-write.

use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::database::Database;

impl Database {
    /// Copy the store file to `backup_path`. Returns `false` on any failure.
    pub fn backup_to(&self, backup_path: &Path) -> bool {
        let Some(db_path) = self.path() else {
            tracing::error!("backup requested on a database without a file path");
            return false;
        };

        // Flush the WAL so the main file alone is a complete snapshot.
        // The pragma reports (busy, log, checkpointed); only failure matters.
        let checkpoint = self
            .conn()
            .query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()));
        if let Err(e) = checkpoint {
            tracing::error!(error = %e, "wal checkpoint before backup failed");
            return false;
        }

        match std::fs::copy(&db_path, backup_path) {
            Ok(_) => {
                tracing::info!(path = %backup_path.display(), "database backed up");
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "backup copy failed");
                false
            }
        }
    }

    /// Replace the active store with the file at `backup_path`, then reopen
    /// (re-running schema creation and reconciliation on the restored file).
    /// Returns `false` on any failure; if the copy itself fails the previous
    /// store file is reopened untouched.
    pub fn restore_from(&mut self, backup_path: &Path) -> bool {
        let Some(db_path) = self.path() else {
            tracing::error!("restore requested on a database without a file path");
            return false;
        };

        // Release the file before overwriting it.
        let placeholder = match Connection::open_in_memory() {
            Ok(conn) => conn,
            Err(e) => {
                tracing::error!(error = %e, "could not stage restore");
                return false;
            }
        };
        let live = std::mem::replace(self.conn_mut(), placeholder);
        if let Err((live, e)) = live.close() {
            *self.conn_mut() = live;
            tracing::error!(error = %e, "could not close live connection for restore");
            return false;
        }

        // Stale WAL/SHM sidecars would shadow the restored file.
        let _ = std::fs::remove_file(sidecar(&db_path, "-wal"));
        let _ = std::fs::remove_file(sidecar(&db_path, "-shm"));

        let copied = match std::fs::copy(backup_path, &db_path) {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(error = %e, "restore copy failed");
                false
            }
        };

        // Reopen whatever is now on disk: the restored file, or the previous
        // one if the copy failed.
        match Database::open_at(&db_path) {
            Ok(reopened) => {
                *self = reopened;
                if copied {
                    tracing::info!(path = %backup_path.display(), "database restored");
                }
                copied
            }
            Err(e) => {
                tracing::error!(error = %e, "reopen after restore failed");
                false
            }
        }
    }
}

fn sidecar(db_path: &Path, suffix: &str) -> PathBuf {
    PathBuf::from(format!("{}{suffix}", db_path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Bus;

    #[test]
    fn restore_returns_the_backed_up_contents() {
        let dir = tempfile::tempdir().unwrap();
        let backup_path = dir.path().join("snapshot.db");
        let mut db = Database::open_at(&dir.path().join("test.db")).unwrap();

        db.add_bus(&Bus {
            id: 0,
            name: "Route A".into(),
            default_target: 5_000_00,
        })
        .unwrap();

        assert!(db.backup_to(&backup_path));

        // Mutate after the snapshot.
        db.add_bus(&Bus {
            id: 0,
            name: "Route B".into(),
            default_target: 3_000_00,
        })
        .unwrap();
        assert_eq!(db.get_all_buses().unwrap().len(), 2);

        assert!(db.restore_from(&backup_path));

        let buses = db.get_all_buses().unwrap();
        assert_eq!(buses.len(), 1);
        assert_eq!(buses[0].name, "Route A");
    }

    #[test]
    fn failures_are_reported_as_false() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = Database::open_at(&dir.path().join("test.db")).unwrap();

        // Destination directory does not exist.
        assert!(!db.backup_to(&dir.path().join("missing/backup.db")));
        // Source file does not exist; the live store survives.
        assert!(!db.restore_from(&dir.path().join("no-such-snapshot.db")));
        assert!(db.get_all_buses().unwrap().is_empty());
    }
}
