//! Domain model structs persisted in the daftar database.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be handed
//! directly to UI and export collaborators.
//!
//! All monetary fields are fixed-point minor units (`i64`). The `id` field
//! of each struct is a SQLite rowid; insert helpers ignore it and return the
//! generated value.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Bus
// ---------------------------------------------------------------------------

/// A transport route with a route-level default fee target.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bus {
    pub id: i64,
    pub name: String,
    /// Default collection target for the route, minor units.
    pub default_target: i64,
}

// ---------------------------------------------------------------------------
// Student
// ---------------------------------------------------------------------------

/// A transport fee payer.
///
/// `paid_amount` is a denormalized running balance kept in sync with the
/// payments ledger by the ledger recorder; reads trust it directly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub father_name: Option<String>,
    pub class_name: Option<String>,
    pub section: Option<String>,
    /// Weak reference to a bus; students without transport carry `None`.
    pub bus_id: Option<i64>,
    pub bus_stop: Option<String>,
    pub phone: Option<String>,
    pub monthly_fee: i64,
    pub target_amount: i64,
    pub paid_amount: i64,
}

// ---------------------------------------------------------------------------
// Payment
// ---------------------------------------------------------------------------

/// An append-only transport fee ledger row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Payment {
    pub id: i64,
    pub student_id: i64,
    pub amount: i64,
    pub payment_date: NaiveDate,
    pub receipt_no: Option<String>,
    /// Billing month label, e.g. "March 2024".
    pub month: Option<String>,
    pub notes: Option<String>,
}

/// A payment joined with the paying student's name and class.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentWithStudent {
    pub id: i64,
    pub student_id: i64,
    pub amount: i64,
    pub payment_date: NaiveDate,
    pub receipt_no: Option<String>,
    pub month: Option<String>,
    pub notes: Option<String>,
    pub student_name: String,
    pub class_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// A one-off collection drive (trip, function, fundraiser).
///
/// `collected_amount` is never stored: every read recomputes it as the sum
/// of the participants' `amount_paid`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub target_amount: i64,
    /// Live-computed on read; ignored on insert and update.
    pub collected_amount: i64,
    pub deadline: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// EventParticipant
// ---------------------------------------------------------------------------

/// A contributor to one event. `amount_paid` is a denormalized balance,
/// same pattern as [`Student::paid_amount`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventParticipant {
    pub id: i64,
    pub event_id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub amount_due: i64,
    pub amount_paid: i64,
}

// ---------------------------------------------------------------------------
// EventPayment
// ---------------------------------------------------------------------------

/// An append-only ledger row for an event participant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventPayment {
    pub id: i64,
    pub participant_id: i64,
    pub amount: i64,
    pub payment_date: NaiveDate,
    pub receipt_no: Option<String>,
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// PrincipalPayment
// ---------------------------------------------------------------------------

/// A disbursement to the principal. Standalone ledger, no parent entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrincipalPayment {
    pub id: i64,
    pub amount: i64,
    pub payment_date: NaiveDate,
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// TeacherDebt
// ---------------------------------------------------------------------------

/// A debt record for a teacher. Standalone ledger, no parent entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeacherDebt {
    pub id: i64,
    pub teacher_name: String,
    pub amount: i64,
    pub debt_date: NaiveDate,
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Row-mapping helpers shared by the repositories
// ---------------------------------------------------------------------------

/// Parse an ISO-8601 date column.
pub(crate) fn date_from_sql(idx: usize, text: &str) -> rusqlite::Result<NaiveDate> {
    text.parse::<NaiveDate>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Parse a nullable ISO-8601 date column.
pub(crate) fn opt_date_from_sql(
    idx: usize,
    text: Option<String>,
) -> rusqlite::Result<Option<NaiveDate>> {
    text.map(|t| date_from_sql(idx, &t)).transpose()
}
