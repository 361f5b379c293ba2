//! Cross-entity aggregates.
//!
//! Two aggregation strategies coexist on purpose:
//! - transport reads the denormalized student balances directly;
//! - events recompute collections from participants on every read and never
//!   trust a stored rollup (see `events.rs`).
//! Each query notes which strategy it uses.

use serde::{Deserialize, Serialize};

use crate::database::Database;
use crate::error::Result;

/// Transport fee summary across all buses.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransportStats {
    /// Students assigned to an existing bus; bus-less students are excluded.
    pub total_students: i64,
    /// Sum of every bus's `default_target`.
    pub total_target: i64,
    /// Sum of `paid_amount` over students assigned to an existing bus.
    pub total_collected: i64,
    /// `max(0, target - collected)`.
    pub total_pending: i64,
}

/// Event collection summary across all events.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventsStats {
    pub total_events: i64,
    pub total_target: i64,
    pub total_collected: i64,
}

/// Principal disbursement summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrincipalStats {
    pub total_paid: i64,
    pub payment_count: i64,
}

/// Teacher debt summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeacherDebtStats {
    pub total_debt: i64,
    pub debt_count: i64,
}

impl Database {
    /// Transport summary. Denormalized-read strategy: trusts the stored
    /// `paid_amount` balances, so the figures reflect "paid since the last
    /// reset" after a period rollover.
    pub fn get_transport_stats(&self) -> Result<TransportStats> {
        self.conn()
            .query_row(
                "SELECT (SELECT IFNULL(SUM(default_target), 0) FROM buses) AS total_target,
                        IFNULL(SUM(s.paid_amount), 0) AS total_collected,
                        COUNT(s.id) AS total_students
                 FROM students s
                 INNER JOIN buses b ON s.bus_id = b.id",
                [],
                |row| {
                    let total_target: i64 = row.get(0)?;
                    let total_collected: i64 = row.get(1)?;
                    let total_students: i64 = row.get(2)?;
                    Ok(TransportStats {
                        total_students,
                        total_target,
                        total_collected,
                        total_pending: (total_target - total_collected).max(0),
                    })
                },
            )
            .map_err(Into::into)
    }

    /// Events summary. Live-computed strategy: collections are summed from
    /// participant balances at query time, never read from the events table.
    pub fn get_events_stats(&self) -> Result<EventsStats> {
        self.conn()
            .query_row(
                "SELECT (SELECT COUNT(*) FROM events) AS total_events,
                        (SELECT IFNULL(SUM(target_amount), 0) FROM events) AS total_target,
                        IFNULL(SUM(p.amount_paid), 0) AS total_collected
                 FROM events e
                 LEFT JOIN event_participants p ON e.id = p.event_id",
                [],
                |row| {
                    Ok(EventsStats {
                        total_events: row.get(0)?,
                        total_target: row.get(1)?,
                        total_collected: row.get(2)?,
                    })
                },
            )
            .map_err(Into::into)
    }

    /// Total disbursed to the principal.
    pub fn get_principal_stats(&self) -> Result<PrincipalStats> {
        self.conn()
            .query_row(
                "SELECT IFNULL(SUM(amount), 0), COUNT(id) FROM principal_payments",
                [],
                |row| {
                    Ok(PrincipalStats {
                        total_paid: row.get(0)?,
                        payment_count: row.get(1)?,
                    })
                },
            )
            .map_err(Into::into)
    }

    /// Total outstanding teacher debt.
    pub fn get_teacher_debt_stats(&self) -> Result<TeacherDebtStats> {
        self.conn()
            .query_row(
                "SELECT IFNULL(SUM(amount), 0), COUNT(id) FROM teacher_debt",
                [],
                |row| {
                    Ok(TeacherDebtStats {
                        total_debt: row.get(0)?,
                        debt_count: row.get(1)?,
                    })
                },
            )
            .map_err(Into::into)
    }
}
