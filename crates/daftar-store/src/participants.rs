//! CRUD operations for [`EventParticipant`] records.

use rusqlite::params;

use crate::database::Database;
use crate::error::Result;
use crate::models::EventParticipant;

impl Database {
    /// Insert a new participant. The struct's `id` is ignored; the generated
    /// rowid is returned.
    pub fn add_event_participant(&self, participant: &EventParticipant) -> Result<i64> {
        self.conn().execute(
            "INSERT INTO event_participants (event_id, name, phone, amount_due, amount_paid)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                participant.event_id,
                participant.name,
                participant.phone,
                participant.amount_due,
                participant.amount_paid,
            ],
        )?;
        Ok(self.conn().last_insert_rowid())
    }

    /// All participants of one event, ordered by name.
    pub fn get_event_participants(&self, event_id: i64) -> Result<Vec<EventParticipant>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, event_id, name, phone, amount_due, amount_paid
             FROM event_participants
             WHERE event_id = ?1
             ORDER BY name",
        )?;

        let rows = stmt.query_map(params![event_id], row_to_participant)?;

        let mut participants = Vec::new();
        for row in rows {
            participants.push(row?);
        }
        Ok(participants)
    }

    /// Replace all mutable fields by id. A missing id is a silent no-op.
    pub fn update_event_participant(&self, participant: &EventParticipant) -> Result<()> {
        self.conn().execute(
            "UPDATE event_participants
             SET name = ?1, phone = ?2, amount_due = ?3, amount_paid = ?4
             WHERE id = ?5",
            params![
                participant.name,
                participant.phone,
                participant.amount_due,
                participant.amount_paid,
                participant.id,
            ],
        )?;
        Ok(())
    }

    /// Hard delete a participant, payment history first. Returns `true` if
    /// the participant row existed.
    pub fn delete_event_participant(&self, id: i64) -> Result<bool> {
        self.conn().execute(
            "DELETE FROM event_payments WHERE participant_id = ?1",
            params![id],
        )?;
        let affected = self
            .conn()
            .execute("DELETE FROM event_participants WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }
}

/// Map a `rusqlite::Row` to an [`EventParticipant`].
fn row_to_participant(row: &rusqlite::Row<'_>) -> rusqlite::Result<EventParticipant> {
    Ok(EventParticipant {
        id: row.get(0)?,
        event_id: row.get(1)?,
        name: row.get(2)?,
        phone: row.get(3)?,
        amount_due: row.get(4)?,
        amount_paid: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::database::Database;
    use crate::models::{Event, EventParticipant, EventPayment};
    use chrono::NaiveDate;

    fn open() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("test.db")).unwrap();
        (dir, db)
    }

    #[test]
    fn participants_list_is_name_ordered_and_delete_cascades() {
        let (_dir, mut db) = open();

        let event_id = db
            .add_event(&Event {
                id: 0,
                name: "Trip".into(),
                description: None,
                target_amount: 0,
                collected_amount: 0,
                deadline: None,
            })
            .unwrap();

        let zain = db
            .add_event_participant(&EventParticipant {
                id: 0,
                event_id,
                name: "Zain".into(),
                phone: None,
                amount_due: 100,
                amount_paid: 0,
            })
            .unwrap();
        db.add_event_participant(&EventParticipant {
            id: 0,
            event_id,
            name: "Amna".into(),
            phone: None,
            amount_due: 100,
            amount_paid: 0,
        })
        .unwrap();

        let names: Vec<String> = db
            .get_event_participants(event_id)
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Amna", "Zain"]);

        db.record_event_payment(&EventPayment {
            id: 0,
            participant_id: zain,
            amount: 50,
            payment_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            receipt_no: None,
            notes: None,
        })
        .unwrap();

        assert!(db.delete_event_participant(zain).unwrap());
        assert!(db.get_participant_payments(zain).unwrap().is_empty());
        assert_eq!(db.get_event_participants(event_id).unwrap().len(), 1);
        // Deleting again reports nothing removed.
        assert!(!db.delete_event_participant(zain).unwrap());
    }
}
