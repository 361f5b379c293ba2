//! The transport fee ledger and its write path.
//!
//! [`Database::record_payment`] appends a ledger row and bumps the student's
//! denormalized `paid_amount` inside one transaction, so the two effects are
//! never observable apart. There is no reversal or void operation; a
//! mistaken payment needs a caller-built correction.

use rusqlite::params;

use crate::database::Database;
use crate::error::Result;
use crate::models::{date_from_sql, Payment, PaymentWithStudent};

impl Database {
    // ------------------------------------------------------------------
    // Write path
    // ------------------------------------------------------------------

    /// Append a payment and increment the student's balance atomically.
    /// Returns the new ledger row's id.
    pub fn record_payment(&mut self, payment: &Payment) -> Result<i64> {
        let tx = self.conn_mut().transaction()?;

        tx.execute(
            "INSERT INTO payments (student_id, amount, payment_date, receipt_no, month, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                payment.student_id,
                payment.amount,
                payment.payment_date.to_string(),
                payment.receipt_no,
                payment.month,
                payment.notes,
            ],
        )?;
        let id = tx.last_insert_rowid();

        tx.execute(
            "UPDATE students SET paid_amount = paid_amount + ?1 WHERE id = ?2",
            params![payment.amount, payment.student_id],
        )?;

        tx.commit()?;
        Ok(id)
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// All payments for one student, most recent first.
    pub fn get_student_payments(&self, student_id: i64) -> Result<Vec<Payment>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, student_id, amount, payment_date, receipt_no, month, notes
             FROM payments
             WHERE student_id = ?1
             ORDER BY payment_date DESC",
        )?;

        let rows = stmt.query_map(params![student_id], row_to_payment)?;

        let mut payments = Vec::new();
        for row in rows {
            payments.push(row?);
        }
        Ok(payments)
    }

    /// Every payment joined with the paying student's name and class, most
    /// recent first.
    pub fn get_all_payments(&self) -> Result<Vec<PaymentWithStudent>> {
        let mut stmt = self.conn().prepare(
            "SELECT p.id, p.student_id, p.amount, p.payment_date, p.receipt_no,
                    p.month, p.notes, s.name, s.class_name
             FROM payments p
             JOIN students s ON p.student_id = s.id
             ORDER BY p.payment_date DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            let date_str: String = row.get(3)?;
            Ok(PaymentWithStudent {
                id: row.get(0)?,
                student_id: row.get(1)?,
                amount: row.get(2)?,
                payment_date: date_from_sql(3, &date_str)?,
                receipt_no: row.get(4)?,
                month: row.get(5)?,
                notes: row.get(6)?,
                student_name: row.get(7)?,
                class_name: row.get(8)?,
            })
        })?;

        let mut payments = Vec::new();
        for row in rows {
            payments.push(row?);
        }
        Ok(payments)
    }

    // ------------------------------------------------------------------
    // Period rollover
    // ------------------------------------------------------------------

    /// Zero `paid_amount` for every student on one bus, leaving the ledger
    /// untouched. Stored balances then mean "paid since last reset", not
    /// lifetime totals, until payments resume. Returns the number of
    /// students affected.
    pub fn reset_bus_payments(&self, bus_id: i64) -> Result<usize> {
        let affected = self.conn().execute(
            "UPDATE students SET paid_amount = 0 WHERE bus_id = ?1",
            params![bus_id],
        )?;
        Ok(affected)
    }

    /// Zero `paid_amount` for every student in the store. Same semantics as
    /// [`Database::reset_bus_payments`].
    pub fn reset_all_payments(&self) -> Result<usize> {
        let affected = self
            .conn()
            .execute("UPDATE students SET paid_amount = 0", [])?;
        Ok(affected)
    }
}

/// Map a `rusqlite::Row` to a [`Payment`].
fn row_to_payment(row: &rusqlite::Row<'_>) -> rusqlite::Result<Payment> {
    let date_str: String = row.get(3)?;
    Ok(Payment {
        id: row.get(0)?,
        student_id: row.get(1)?,
        amount: row.get(2)?,
        payment_date: date_from_sql(3, &date_str)?,
        receipt_no: row.get(4)?,
        month: row.get(5)?,
        notes: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::database::Database;
    use crate::models::{Bus, Payment, Student};
    use chrono::NaiveDate;

    fn open() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("test.db")).unwrap();
        (dir, db)
    }

    fn payment(student_id: i64, amount: i64, day: u32) -> Payment {
        Payment {
            id: 0,
            student_id,
            amount,
            payment_date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            receipt_no: Some(format!("RCP-{day}")),
            month: Some("March 2024".into()),
            notes: None,
        }
    }

    fn enroll(db: &Database, bus_id: Option<i64>, target: i64) -> i64 {
        db.add_student(&Student {
            id: 0,
            name: "X".into(),
            father_name: None,
            class_name: None,
            section: None,
            bus_id,
            bus_stop: None,
            phone: None,
            monthly_fee: target,
            target_amount: target,
            paid_amount: 0,
        })
        .unwrap()
    }

    #[test]
    fn balance_accumulates_across_payments() {
        let (_dir, mut db) = open();
        let student_id = enroll(&db, None, 10_000_00);

        for (day, amount) in [(1, 2_000_00), (8, 3_000_00), (15, 500_00)] {
            db.record_payment(&payment(student_id, amount, day)).unwrap();
        }

        let student = db.get_student_by_id(student_id).unwrap().unwrap();
        assert_eq!(student.paid_amount, 5_500_00);

        let history = db.get_student_payments(student_id).unwrap();
        assert_eq!(history.len(), 3);
        // Most recent first.
        assert_eq!(history[0].amount, 500_00);
    }

    #[test]
    fn payment_clears_defaulter_once_target_met() {
        let (_dir, mut db) = open();

        let bus_id = db
            .add_bus(&Bus {
                id: 0,
                name: "Route A".into(),
                default_target: 5_000_00,
            })
            .unwrap();
        let student_id = enroll(&db, Some(bus_id), 5_000_00);

        db.record_payment(&payment(student_id, 2_000_00, 1)).unwrap();
        assert_eq!(
            db.get_student_by_id(student_id).unwrap().unwrap().paid_amount,
            2_000_00
        );
        assert!(db
            .get_defaulters()
            .unwrap()
            .iter()
            .any(|s| s.id == student_id));

        db.record_payment(&payment(student_id, 3_000_00, 2)).unwrap();
        assert!(!db
            .get_defaulters()
            .unwrap()
            .iter()
            .any(|s| s.id == student_id));
    }

    #[test]
    fn reset_zeroes_balances_but_keeps_history() {
        let (_dir, mut db) = open();

        let bus_id = db
            .add_bus(&Bus {
                id: 0,
                name: "Route A".into(),
                default_target: 5_000_00,
            })
            .unwrap();
        let on_bus = enroll(&db, Some(bus_id), 5_000_00);
        let off_bus = enroll(&db, None, 5_000_00);

        db.record_payment(&payment(on_bus, 2_000_00, 1)).unwrap();
        db.record_payment(&payment(off_bus, 1_000_00, 1)).unwrap();

        assert_eq!(db.reset_bus_payments(bus_id).unwrap(), 1);

        assert_eq!(db.get_student_by_id(on_bus).unwrap().unwrap().paid_amount, 0);
        // History is unchanged in count and amount.
        let history = db.get_student_payments(on_bus).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].amount, 2_000_00);
        // The other bus's student is untouched.
        assert_eq!(
            db.get_student_by_id(off_bus).unwrap().unwrap().paid_amount,
            1_000_00
        );

        assert_eq!(db.reset_all_payments().unwrap(), 2);
        assert_eq!(
            db.get_student_by_id(off_bus).unwrap().unwrap().paid_amount,
            0
        );
    }

    #[test]
    fn all_payments_projection_carries_student_name() {
        let (_dir, mut db) = open();

        let student_id = db
            .add_student(&Student {
                id: 0,
                name: "Ahmed".into(),
                father_name: None,
                class_name: Some("5".into()),
                section: None,
                bus_id: None,
                bus_stop: None,
                phone: None,
                monthly_fee: 0,
                target_amount: 0,
                paid_amount: 0,
            })
            .unwrap();
        db.record_payment(&payment(student_id, 750_00, 3)).unwrap();

        let all = db.get_all_payments().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].student_name, "Ahmed");
        assert_eq!(all[0].class_name.as_deref(), Some("5"));
        assert_eq!(all[0].amount, 750_00);
    }
}
