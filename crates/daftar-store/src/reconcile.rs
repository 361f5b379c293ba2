//! Startup orphan reconciler.
//!
//! `active = 0` is a legacy soft-delete marker that normal operation never
//! produces (all deletes in this store are hard and cascading), but that may
//! appear through external data manipulation or partial migrations. This
//! pass removes everything so marked, cascading to dependents, and then
//! removes any remaining orphans, restoring referential closure before any
//! other component touches the store.
//!
//! The pass is idempotent: running it twice yields the same table contents
//! as running it once.

use rusqlite::Connection;

use crate::error::Result;

/// Cleanup statements in dependency order, deepest children first.
///
/// Parent orphans are removed before child orphans so that rows orphaned by
/// an earlier statement are caught within the same pass.
const PASSES: &[(&str, &str)] = &[
    // Inactive events and everything under them.
    (
        "event payments of inactive events",
        "DELETE FROM event_payments WHERE participant_id IN
            (SELECT id FROM event_participants WHERE event_id IN
                (SELECT id FROM events WHERE active = 0))",
    ),
    (
        "participants of inactive events",
        "DELETE FROM event_participants WHERE event_id IN
            (SELECT id FROM events WHERE active = 0)",
    ),
    ("inactive events", "DELETE FROM events WHERE active = 0"),
    // Inactive buses and everything under them.
    (
        "payments of students on inactive buses",
        "DELETE FROM payments WHERE student_id IN
            (SELECT id FROM students WHERE bus_id IN
                (SELECT id FROM buses WHERE active = 0))",
    ),
    (
        "students on inactive buses",
        "DELETE FROM students WHERE bus_id IN
            (SELECT id FROM buses WHERE active = 0)",
    ),
    ("inactive buses", "DELETE FROM buses WHERE active = 0"),
    // Inactive students.
    (
        "payments of inactive students",
        "DELETE FROM payments WHERE student_id IN
            (SELECT id FROM students WHERE active = 0)",
    ),
    ("inactive students", "DELETE FROM students WHERE active = 0"),
    // Remaining orphans, parents before children.
    (
        "students referencing a missing bus",
        "DELETE FROM students WHERE bus_id NOT IN (SELECT id FROM buses)
            AND bus_id IS NOT NULL",
    ),
    (
        "orphaned payments",
        "DELETE FROM payments WHERE student_id NOT IN (SELECT id FROM students)",
    ),
    (
        "participants referencing a missing event",
        "DELETE FROM event_participants WHERE event_id NOT IN (SELECT id FROM events)",
    ),
    (
        "orphaned event payments",
        "DELETE FROM event_payments WHERE participant_id NOT IN
            (SELECT id FROM event_participants)",
    ),
];

/// Run the full reconciliation pass.
pub fn reconcile(conn: &Connection) -> Result<()> {
    for (what, sql) in PASSES {
        let removed = conn.execute(sql, [])?;
        if removed > 0 {
            tracing::info!(what, removed, "reconciler removed rows");
        }
    }
    Ok(())
}
