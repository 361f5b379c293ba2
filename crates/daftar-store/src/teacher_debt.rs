//! CRUD operations for [`TeacherDebt`] records.
//!
//! A standalone ledger with no parent entity; totals come from `stats.rs`.

use rusqlite::params;

use crate::database::Database;
use crate::error::Result;
use crate::models::{date_from_sql, TeacherDebt};

impl Database {
    /// Insert a new debt record. The struct's `id` is ignored; the generated
    /// rowid is returned.
    pub fn add_teacher_debt(&self, debt: &TeacherDebt) -> Result<i64> {
        self.conn().execute(
            "INSERT INTO teacher_debt (teacher_name, amount, debt_date, notes)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                debt.teacher_name,
                debt.amount,
                debt.debt_date.to_string(),
                debt.notes
            ],
        )?;
        Ok(self.conn().last_insert_rowid())
    }

    /// All debt records, most recent first.
    pub fn get_all_teacher_debt(&self) -> Result<Vec<TeacherDebt>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, teacher_name, amount, debt_date, notes
             FROM teacher_debt
             ORDER BY debt_date DESC",
        )?;

        let rows = stmt.query_map([], row_to_teacher_debt)?;

        let mut debts = Vec::new();
        for row in rows {
            debts.push(row?);
        }
        Ok(debts)
    }

    /// Replace all mutable fields by id. A missing id is a silent no-op.
    pub fn update_teacher_debt(&self, debt: &TeacherDebt) -> Result<()> {
        self.conn().execute(
            "UPDATE teacher_debt
             SET teacher_name = ?1, amount = ?2, debt_date = ?3, notes = ?4
             WHERE id = ?5",
            params![
                debt.teacher_name,
                debt.amount,
                debt.debt_date.to_string(),
                debt.notes,
                debt.id,
            ],
        )?;
        Ok(())
    }

    /// Delete a debt record. Returns `true` if the row existed.
    pub fn delete_teacher_debt(&self, id: i64) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM teacher_debt WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }
}

/// Map a `rusqlite::Row` to a [`TeacherDebt`].
fn row_to_teacher_debt(row: &rusqlite::Row<'_>) -> rusqlite::Result<TeacherDebt> {
    let date_str: String = row.get(3)?;
    Ok(TeacherDebt {
        id: row.get(0)?,
        teacher_name: row.get(1)?,
        amount: row.get(2)?,
        debt_date: date_from_sql(3, &date_str)?,
        notes: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::database::Database;
    use crate::models::TeacherDebt;
    use chrono::NaiveDate;

    #[test]
    fn crud_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("test.db")).unwrap();

        let id = db
            .add_teacher_debt(&TeacherDebt {
                id: 0,
                teacher_name: "Mr. Khan".into(),
                amount: 3_000_00,
                debt_date: NaiveDate::from_ymd_opt(2024, 2, 5).unwrap(),
                notes: None,
            })
            .unwrap();
        db.add_teacher_debt(&TeacherDebt {
            id: 0,
            teacher_name: "Ms. Fatima".into(),
            amount: 1_500_00,
            debt_date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            notes: Some("advance".into()),
        })
        .unwrap();

        let all = db.get_all_teacher_debt().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].teacher_name, "Ms. Fatima");

        db.update_teacher_debt(&TeacherDebt {
            id,
            teacher_name: "Mr. Khan".into(),
            amount: 2_000_00,
            debt_date: NaiveDate::from_ymd_opt(2024, 2, 5).unwrap(),
            notes: Some("partially repaid".into()),
        })
        .unwrap();

        assert!(db.delete_teacher_debt(id).unwrap());
        assert_eq!(db.get_all_teacher_debt().unwrap().len(), 1);
    }
}
