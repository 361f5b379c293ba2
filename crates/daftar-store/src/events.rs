//! CRUD operations for [`Event`] records.
//!
//! An event's `collected_amount` is never stored: every read recomputes it
//! from the participants' `amount_paid` via a grouped outer join (zero when
//! there are no participants). Per-participant dues can change after
//! creation, so a stored rollup would drift. This is deliberately the
//! opposite strategy from students, whose balances are denormalized.

use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::error::Result;
use crate::models::{opt_date_from_sql, Event};

const EVENT_SELECT: &str = "SELECT e.id, e.name, e.description, e.target_amount, \
                                   IFNULL(SUM(p.amount_paid), 0) AS collected_amount, \
                                   e.deadline \
                            FROM events e \
                            LEFT JOIN event_participants p ON e.id = p.event_id";

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a new event. The struct's `id` and `collected_amount` are
    /// ignored; the generated rowid is returned.
    pub fn add_event(&self, event: &Event) -> Result<i64> {
        self.conn().execute(
            "INSERT INTO events (name, description, target_amount, deadline)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                event.name,
                event.description,
                event.target_amount,
                event.deadline.map(|d| d.to_string()),
            ],
        )?;
        Ok(self.conn().last_insert_rowid())
    }

    // ------------------------------------------------------------------
    // Read (collected amount live-computed)
    // ------------------------------------------------------------------

    /// Fetch a single event by id, with its collected amount recomputed.
    pub fn get_event_by_id(&self, id: i64) -> Result<Option<Event>> {
        self.conn()
            .query_row(
                &format!("{EVENT_SELECT} WHERE e.id = ?1 GROUP BY e.id"),
                params![id],
                row_to_event,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List all events, ordered by deadline descending then creation time
    /// descending.
    pub fn get_all_events(&self) -> Result<Vec<Event>> {
        let mut stmt = self.conn().prepare(&format!(
            "{EVENT_SELECT} GROUP BY e.id ORDER BY e.deadline DESC, e.created_at DESC"
        ))?;

        let rows = stmt.query_map([], row_to_event)?;

        let mut events = Vec::new();
        for row in rows {
            events.push(row?);
        }
        Ok(events)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Replace name, description, target and deadline by id. The collected
    /// amount is not writable. A missing id is a silent no-op.
    pub fn update_event(&self, event: &Event) -> Result<()> {
        self.conn().execute(
            "UPDATE events
             SET name = ?1, description = ?2, target_amount = ?3, deadline = ?4
             WHERE id = ?5",
            params![
                event.name,
                event.description,
                event.target_amount,
                event.deadline.map(|d| d.to_string()),
                event.id,
            ],
        )?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Hard delete an event, cascading through its participants and their
    /// payments (deepest first). Returns `true` if the event row existed.
    pub fn delete_event(&self, id: i64) -> Result<bool> {
        self.conn().execute(
            "DELETE FROM event_payments WHERE participant_id IN
                (SELECT id FROM event_participants WHERE event_id = ?1)",
            params![id],
        )?;
        self.conn().execute(
            "DELETE FROM event_participants WHERE event_id = ?1",
            params![id],
        )?;
        let affected = self
            .conn()
            .execute("DELETE FROM events WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }
}

/// Map a `rusqlite::Row` to an [`Event`].
fn row_to_event(row: &rusqlite::Row<'_>) -> rusqlite::Result<Event> {
    let deadline_str: Option<String> = row.get(5)?;
    Ok(Event {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        target_amount: row.get(3)?,
        collected_amount: row.get(4)?,
        deadline: opt_date_from_sql(5, deadline_str)?,
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

    fn event(name: &str, target: i64) -> Event {
        Event {
            id: 0,
            name: name.into(),
            description: None,
            target_amount: target,
            collected_amount: 0,
            deadline: NaiveDate::from_ymd_opt(2024, 6, 1),
        }
    }

    fn participant(event_id: i64, name: &str, due: i64) -> EventParticipant {
        EventParticipant {
            id: 0,
            event_id,
            name: name.into(),
            phone: None,
            amount_due: due,
            amount_paid: 0,
        }
    }

    #[test]
    fn collected_amount_is_recomputed_from_participants() {
        let (_dir, mut db) = open();

        let event_id = db.add_event(&event("Trip", 1_000_00)).unwrap();

        // No participants yet: collected is zero, not NULL.
        let fetched = db.get_event_by_id(event_id).unwrap().unwrap();
        assert_eq!(fetched.collected_amount, 0);

        let participant_id = db
            .add_event_participant(&participant(event_id, "Y", 1_000_00))
            .unwrap();
        db.record_event_payment(&EventPayment {
            id: 0,
            participant_id,
            amount: 1_000_00,
            payment_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            receipt_no: None,
            notes: None,
        })
        .unwrap();

        // The event row itself was never written, yet the read reflects the
        // participant's balance.
        let fetched = db.get_event_by_id(event_id).unwrap().unwrap();
        assert_eq!(fetched.collected_amount, 1_000_00);
    }

    #[test]
    fn participant_edit_shows_up_without_an_event_write() {
        let (_dir, db) = open();

        let event_id = db.add_event(&event("Fair", 2_000_00)).unwrap();
        let participant_id = db
            .add_event_participant(&participant(event_id, "Y", 2_000_00))
            .unwrap();

        // Direct balance edit on the participant, no event-table write.
        let mut p = db
            .get_event_participants(event_id)
            .unwrap()
            .into_iter()
            .find(|p| p.id == participant_id)
            .unwrap();
        p.amount_paid = 350_00;
        db.update_event_participant(&p).unwrap();

        assert_eq!(
            db.get_event_by_id(event_id).unwrap().unwrap().collected_amount,
            350_00
        );
        let all = db.get_all_events().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].collected_amount, 350_00);
    }

    #[test]
    fn delete_cascades_to_participants_and_payments() {
        let (_dir, mut db) = open();

        let event_id = db.add_event(&event("Trip", 1_000_00)).unwrap();
        let participant_id = db
            .add_event_participant(&participant(event_id, "Y", 1_000_00))
            .unwrap();
        db.record_event_payment(&EventPayment {
            id: 0,
            participant_id,
            amount: 200_00,
            payment_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            receipt_no: None,
            notes: None,
        })
        .unwrap();

        assert!(db.delete_event(event_id).unwrap());
        assert!(db.get_event_by_id(event_id).unwrap().is_none());
        assert!(db.get_event_participants(event_id).unwrap().is_empty());
        assert!(db
            .get_participant_payments(participant_id)
            .unwrap()
            .is_empty());
    }
}
