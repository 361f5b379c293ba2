//! Schema creation and additive column migrations.
//!
//! There is no schema version table. [`ensure_schema`] is safe to run on
//! every startup: tables are created with `IF NOT EXISTS`, and late-added
//! columns are probed with a harmless read before an `ALTER TABLE` is
//! attempted. An alteration the engine rejects is logged and skipped, never
//! fatal. The pass only creates tables and columns; it never mutates data.

use rusqlite::Connection;

use crate::error::Result;

/// SQL executed on every open. All monetary columns are INTEGER minor units.
const CREATE_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Buses (transport routes)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS buses (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    name           TEXT NOT NULL,
    default_target INTEGER NOT NULL DEFAULT 0,    -- route fee target, minor units
    active         INTEGER NOT NULL DEFAULT 1,    -- legacy marker, reconciled away
    created_at     TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

-- ----------------------------------------------------------------
-- Students
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS students (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    name          TEXT NOT NULL,
    father_name   TEXT,
    class_name    TEXT,
    section       TEXT,
    bus_id        INTEGER,                        -- nullable weak ref -> buses(id)
    bus_stop      TEXT,
    phone         TEXT,
    monthly_fee   INTEGER NOT NULL DEFAULT 0,
    target_amount INTEGER NOT NULL DEFAULT 0,
    paid_amount   INTEGER NOT NULL DEFAULT 0,     -- denormalized running balance
    active        INTEGER NOT NULL DEFAULT 1,
    created_at    TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,

    FOREIGN KEY (bus_id) REFERENCES buses (id)
);

-- ----------------------------------------------------------------
-- Payments (append-only transport fee ledger)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS payments (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    student_id   INTEGER NOT NULL,
    amount       INTEGER NOT NULL,
    payment_date TEXT NOT NULL,                   -- ISO-8601 date
    receipt_no   TEXT,
    month        TEXT,
    notes        TEXT,
    created_at   TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,

    FOREIGN KEY (student_id) REFERENCES students (id)
);

-- ----------------------------------------------------------------
-- Events
--
-- No collected/paid column: an event's collected amount is always
-- recomputed from its participants at read time.
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS events (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    name          TEXT NOT NULL,
    description   TEXT,
    target_amount INTEGER NOT NULL DEFAULT 0,
    deadline      TEXT,
    active        INTEGER NOT NULL DEFAULT 1,
    created_at    TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

-- ----------------------------------------------------------------
-- Event participants
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS event_participants (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    event_id    INTEGER NOT NULL,
    name        TEXT NOT NULL,
    phone       TEXT,
    amount_due  INTEGER NOT NULL DEFAULT 0,
    amount_paid INTEGER NOT NULL DEFAULT 0,       -- denormalized running balance
    created_at  TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,

    FOREIGN KEY (event_id) REFERENCES events (id)
);

-- ----------------------------------------------------------------
-- Event payments (append-only ledger for participants)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS event_payments (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    participant_id INTEGER NOT NULL,
    amount         INTEGER NOT NULL,
    payment_date   TEXT NOT NULL,
    receipt_no     TEXT,
    notes          TEXT,
    created_at     TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,

    FOREIGN KEY (participant_id) REFERENCES event_participants (id)
);

-- ----------------------------------------------------------------
-- Principal payments (standalone ledger, no parent)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS principal_payments (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    amount       INTEGER NOT NULL,
    payment_date TEXT NOT NULL,
    notes        TEXT,
    created_at   TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

-- ----------------------------------------------------------------
-- Teacher debt (standalone ledger, no parent)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS teacher_debt (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    teacher_name TEXT NOT NULL,
    amount       INTEGER NOT NULL,
    debt_date    TEXT NOT NULL,
    notes        TEXT,
    created_at   TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#;

/// Columns added to `students` after early deployments; probed individually
/// so files created by any prior schema version upgrade cleanly.
const STUDENT_COLUMNS: &[(&str, &str)] = &[
    ("father_name", "TEXT"),
    ("section", "TEXT"),
    ("bus_stop", "TEXT"),
    ("bus_id", "INTEGER REFERENCES buses(id)"),
];

/// Lookup indexes, applied after the column migrations because some cover
/// late-added columns.
const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_students_bus_id ON students(bus_id)",
    "CREATE INDEX IF NOT EXISTS idx_payments_student_id ON payments(student_id)",
    "CREATE INDEX IF NOT EXISTS idx_event_participants_event_id
        ON event_participants(event_id)",
    "CREATE INDEX IF NOT EXISTS idx_event_payments_participant_id
        ON event_payments(participant_id)",
];

/// Create all tables if missing, then apply additive column migrations and
/// lookup indexes.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_SQL)?;

    for (column, column_type) in STUDENT_COLUMNS {
        add_column_if_missing(conn, "students", column, column_type);
    }

    // An index over a column whose migration was skipped must not abort
    // startup either.
    for sql in INDEXES {
        if let Err(e) = conn.execute(sql, []) {
            tracing::warn!(error = %e, "index creation skipped");
        }
    }

    Ok(())
}

/// Probe `column` with a harmless read; add it when the probe fails.
///
/// A failing `ALTER TABLE` is logged and skipped so startup never aborts on
/// an in-place alteration the engine rejects.
fn add_column_if_missing(conn: &Connection, table: &str, column: &str, column_type: &str) {
    let probe = format!("SELECT {column} FROM {table} LIMIT 1");
    if conn.prepare(&probe).is_ok() {
        return;
    }

    tracing::info!(table, column, "adding missing column");

    let alter = format!("ALTER TABLE {table} ADD COLUMN {column} {column_type}");
    if let Err(e) = conn.execute(&alter, []) {
        tracing::warn!(table, column, error = %e, "column migration skipped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        ensure_schema(&conn).unwrap();

        // All eight tables exist.
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
                 AND name IN ('buses', 'students', 'payments', 'events',
                              'event_participants', 'event_payments',
                              'principal_payments', 'teacher_debt')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 8);
    }

    #[test]
    fn legacy_students_table_gains_missing_columns() {
        let conn = Connection::open_in_memory().unwrap();

        // Shape of the students table before father_name/section/bus_stop/
        // bus_id existed.
        conn.execute_batch(
            "CREATE TABLE students (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                name          TEXT NOT NULL,
                class_name    TEXT,
                phone         TEXT,
                monthly_fee   INTEGER NOT NULL DEFAULT 0,
                target_amount INTEGER NOT NULL DEFAULT 0,
                paid_amount   INTEGER NOT NULL DEFAULT 0,
                active        INTEGER NOT NULL DEFAULT 1,
                created_at    TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            INSERT INTO students (name) VALUES ('Existing');",
        )
        .unwrap();

        ensure_schema(&conn).unwrap();

        // The probe columns are now readable and the old row survived.
        let (name, bus_stop): (String, Option<String>) = conn
            .query_row(
                "SELECT name, bus_stop FROM students LIMIT 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(name, "Existing");
        assert_eq!(bus_stop, None);
    }
}
