//! The event contribution ledger and its write path.
//!
//! Mirrors `payments.rs`: [`Database::record_event_payment`] appends a
//! ledger row and bumps the owning participant's denormalized `amount_paid`
//! inside one transaction.

use rusqlite::params;

use crate::database::Database;
use crate::error::Result;
use crate::models::{date_from_sql, EventPayment};

impl Database {
    /// Append an event payment and increment the participant's balance
    /// atomically. Returns the new ledger row's id.
    pub fn record_event_payment(&mut self, payment: &EventPayment) -> Result<i64> {
        let tx = self.conn_mut().transaction()?;

        tx.execute(
            "INSERT INTO event_payments (participant_id, amount, payment_date, receipt_no, notes)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                payment.participant_id,
                payment.amount,
                payment.payment_date.to_string(),
                payment.receipt_no,
                payment.notes,
            ],
        )?;
        let id = tx.last_insert_rowid();

        tx.execute(
            "UPDATE event_participants SET amount_paid = amount_paid + ?1 WHERE id = ?2",
            params![payment.amount, payment.participant_id],
        )?;

        tx.commit()?;
        Ok(id)
    }

    /// All payments for one participant, most recent first.
    pub fn get_participant_payments(&self, participant_id: i64) -> Result<Vec<EventPayment>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, participant_id, amount, payment_date, receipt_no, notes
             FROM event_payments
             WHERE participant_id = ?1
             ORDER BY payment_date DESC",
        )?;

        let rows = stmt.query_map(params![participant_id], row_to_event_payment)?;

        let mut payments = Vec::new();
        for row in rows {
            payments.push(row?);
        }
        Ok(payments)
    }
}

/// Map a `rusqlite::Row` to an [`EventPayment`].
fn row_to_event_payment(row: &rusqlite::Row<'_>) -> rusqlite::Result<EventPayment> {
    let date_str: String = row.get(3)?;
    Ok(EventPayment {
        id: row.get(0)?,
        participant_id: row.get(1)?,
        amount: row.get(2)?,
        payment_date: date_from_sql(3, &date_str)?,
        receipt_no: row.get(4)?,
        notes: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::database::Database;
    use crate::models::{Event, EventParticipant, EventPayment};
    use chrono::NaiveDate;

    #[test]
    fn balance_accumulates_and_history_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = Database::open_at(&dir.path().join("test.db")).unwrap();

        let event_id = db
            .add_event(&Event {
                id: 0,
                name: "Fair".into(),
                description: None,
                target_amount: 5_000_00,
                collected_amount: 0,
                deadline: None,
            })
            .unwrap();
        let participant_id = db
            .add_event_participant(&EventParticipant {
                id: 0,
                event_id,
                name: "Y".into(),
                phone: None,
                amount_due: 5_000_00,
                amount_paid: 0,
            })
            .unwrap();

        for (day, amount) in [(1, 1_500_00), (9, 2_500_00)] {
            db.record_event_payment(&EventPayment {
                id: 0,
                participant_id,
                amount,
                payment_date: NaiveDate::from_ymd_opt(2024, 4, day).unwrap(),
                receipt_no: None,
                notes: None,
            })
            .unwrap();
        }

        let participant = db
            .get_event_participants(event_id)
            .unwrap()
            .into_iter()
            .find(|p| p.id == participant_id)
            .unwrap();
        assert_eq!(participant.amount_paid, 4_000_00);

        let history = db.get_participant_payments(participant_id).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].amount, 2_500_00);
    }
}
