//! CRUD operations and queries for [`Student`] records.
//!
//! A student's `paid_amount` is a denormalized running balance maintained by
//! the ledger recorder in `payments.rs`; none of the queries here recompute
//! it.

use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::error::Result;
use crate::models::Student;

const STUDENT_COLS: &str = "id, name, father_name, class_name, section, bus_id, bus_stop, \
                            phone, monthly_fee, target_amount, paid_amount";

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a new student. The struct's `id` is ignored; the generated
    /// rowid is returned.
    pub fn add_student(&self, student: &Student) -> Result<i64> {
        self.conn().execute(
            "INSERT INTO students (name, father_name, class_name, section, bus_id,
                                   bus_stop, phone, monthly_fee, target_amount, paid_amount)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                student.name,
                student.father_name,
                student.class_name,
                student.section,
                student.bus_id,
                student.bus_stop,
                student.phone,
                student.monthly_fee,
                student.target_amount,
                student.paid_amount,
            ],
        )?;
        Ok(self.conn().last_insert_rowid())
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Fetch a single student by id.
    pub fn get_student_by_id(&self, id: i64) -> Result<Option<Student>> {
        self.conn()
            .query_row(
                &format!("SELECT {STUDENT_COLS} FROM students WHERE id = ?1"),
                params![id],
                row_to_student,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List all students, ordered by class then name. Ties fall back to
    /// natural insertion order; callers must not depend on that.
    pub fn get_all_students(&self) -> Result<Vec<Student>> {
        self.query_students(
            &format!("SELECT {STUDENT_COLS} FROM students ORDER BY class_name, name"),
            params![],
        )
    }

    /// Students assigned to one bus, ordered by name.
    pub fn get_students_by_bus(&self, bus_id: i64) -> Result<Vec<Student>> {
        self.query_students(
            &format!("SELECT {STUDENT_COLS} FROM students WHERE bus_id = ?1 ORDER BY name"),
            params![bus_id],
        )
    }

    /// Case-insensitive substring search over name, father's name, class and
    /// bus stop.
    pub fn search_students(&self, term: &str) -> Result<Vec<Student>> {
        let pattern = format!("%{term}%");
        self.query_students(
            &format!(
                "SELECT {STUDENT_COLS} FROM students
                 WHERE (name LIKE ?1 OR father_name LIKE ?1
                        OR class_name LIKE ?1 OR bus_stop LIKE ?1)
                 ORDER BY class_name, name"
            ),
            params![pattern],
        )
    }

    /// Students whose stored balance has not reached their target.
    pub fn get_defaulters(&self) -> Result<Vec<Student>> {
        self.query_students(
            &format!(
                "SELECT {STUDENT_COLS} FROM students
                 WHERE paid_amount < target_amount
                 ORDER BY class_name, name"
            ),
            params![],
        )
    }

    fn query_students(&self, sql: &str, args: &[&dyn rusqlite::ToSql]) -> Result<Vec<Student>> {
        let mut stmt = self.conn().prepare(sql)?;
        let rows = stmt.query_map(args, row_to_student)?;

        let mut students = Vec::new();
        for row in rows {
            students.push(row?);
        }
        Ok(students)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Replace all mutable fields by id. A missing id is a silent no-op.
    pub fn update_student(&self, student: &Student) -> Result<()> {
        self.conn().execute(
            "UPDATE students
             SET name = ?1, father_name = ?2, class_name = ?3, section = ?4,
                 bus_id = ?5, bus_stop = ?6, phone = ?7, monthly_fee = ?8,
                 target_amount = ?9, paid_amount = ?10
             WHERE id = ?11",
            params![
                student.name,
                student.father_name,
                student.class_name,
                student.section,
                student.bus_id,
                student.bus_stop,
                student.phone,
                student.monthly_fee,
                student.target_amount,
                student.paid_amount,
                student.id,
            ],
        )?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Hard delete a student, payment history first. Returns `true` if the
    /// student row existed.
    pub fn delete_student(&self, id: i64) -> Result<bool> {
        self.conn()
            .execute("DELETE FROM payments WHERE student_id = ?1", params![id])?;
        let affected = self
            .conn()
            .execute("DELETE FROM students WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }
}

/// Map a `rusqlite::Row` to a [`Student`].
fn row_to_student(row: &rusqlite::Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        id: row.get(0)?,
        name: row.get(1)?,
        father_name: row.get(2)?,
        class_name: row.get(3)?,
        section: row.get(4)?,
        bus_id: row.get(5)?,
        bus_stop: row.get(6)?,
        phone: row.get(7)?,
        monthly_fee: row.get(8)?,
        target_amount: row.get(9)?,
        paid_amount: row.get(10)?,
    })
}
