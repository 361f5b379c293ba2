//! CRUD operations for [`PrincipalPayment`] records.
//!
//! A standalone ledger with no parent entity and no denormalized balance;
//! totals come from `stats.rs`.

use rusqlite::params;

use crate::database::Database;
use crate::error::Result;
use crate::models::{date_from_sql, PrincipalPayment};

impl Database {
    /// Insert a new principal payment. The struct's `id` is ignored; the
    /// generated rowid is returned.
    pub fn add_principal_payment(&self, payment: &PrincipalPayment) -> Result<i64> {
        self.conn().execute(
            "INSERT INTO principal_payments (amount, payment_date, notes)
             VALUES (?1, ?2, ?3)",
            params![
                payment.amount,
                payment.payment_date.to_string(),
                payment.notes
            ],
        )?;
        Ok(self.conn().last_insert_rowid())
    }

    /// All principal payments, most recent first.
    pub fn get_all_principal_payments(&self) -> Result<Vec<PrincipalPayment>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, amount, payment_date, notes
             FROM principal_payments
             ORDER BY payment_date DESC, created_at DESC",
        )?;

        let rows = stmt.query_map([], row_to_principal_payment)?;

        let mut payments = Vec::new();
        for row in rows {
            payments.push(row?);
        }
        Ok(payments)
    }

    /// Replace all mutable fields by id. A missing id is a silent no-op.
    pub fn update_principal_payment(&self, payment: &PrincipalPayment) -> Result<()> {
        self.conn().execute(
            "UPDATE principal_payments
             SET amount = ?1, payment_date = ?2, notes = ?3
             WHERE id = ?4",
            params![
                payment.amount,
                payment.payment_date.to_string(),
                payment.notes,
                payment.id,
            ],
        )?;
        Ok(())
    }

    /// Delete a principal payment. Returns `true` if the row existed.
    pub fn delete_principal_payment(&self, id: i64) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM principal_payments WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }
}

/// Map a `rusqlite::Row` to a [`PrincipalPayment`].
fn row_to_principal_payment(row: &rusqlite::Row<'_>) -> rusqlite::Result<PrincipalPayment> {
    let date_str: String = row.get(2)?;
    Ok(PrincipalPayment {
        id: row.get(0)?,
        amount: row.get(1)?,
        payment_date: date_from_sql(2, &date_str)?,
        notes: row.get(3)?,
    })
}
