//! CRUD operations for [`Bus`] records.

use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::error::Result;
use crate::models::Bus;

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a new bus. The struct's `id` is ignored; the generated rowid
    /// is returned.
    pub fn add_bus(&self, bus: &Bus) -> Result<i64> {
        self.conn().execute(
            "INSERT INTO buses (name, default_target) VALUES (?1, ?2)",
            params![bus.name, bus.default_target],
        )?;
        Ok(self.conn().last_insert_rowid())
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Fetch a single bus by id.
    pub fn get_bus_by_id(&self, id: i64) -> Result<Option<Bus>> {
        self.conn()
            .query_row(
                "SELECT id, name, default_target FROM buses WHERE id = ?1",
                params![id],
                row_to_bus,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List all buses, ordered by name.
    pub fn get_all_buses(&self) -> Result<Vec<Bus>> {
        let mut stmt = self
            .conn()
            .prepare("SELECT id, name, default_target FROM buses ORDER BY name")?;

        let rows = stmt.query_map([], row_to_bus)?;

        let mut buses = Vec::new();
        for row in rows {
            buses.push(row?);
        }
        Ok(buses)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Replace name and target by id. A missing id is a silent no-op.
    pub fn update_bus(&self, bus: &Bus) -> Result<()> {
        self.conn().execute(
            "UPDATE buses SET name = ?1, default_target = ?2 WHERE id = ?3",
            params![bus.name, bus.default_target, bus.id],
        )?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Hard delete a bus, cascading through its students and their payment
    /// history (deepest first). Returns `true` if the bus row existed.
    pub fn delete_bus(&self, id: i64) -> Result<bool> {
        self.conn().execute(
            "DELETE FROM payments WHERE student_id IN
                (SELECT id FROM students WHERE bus_id = ?1)",
            params![id],
        )?;
        self.conn()
            .execute("DELETE FROM students WHERE bus_id = ?1", params![id])?;
        let affected = self
            .conn()
            .execute("DELETE FROM buses WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }
}

/// Map a `rusqlite::Row` to a [`Bus`].
fn row_to_bus(row: &rusqlite::Row<'_>) -> rusqlite::Result<Bus> {
    Ok(Bus {
        id: row.get(0)?,
        name: row.get(1)?,
        default_target: row.get(2)?,
    })
}
