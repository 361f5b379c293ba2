//! # daftar-store
//!
//! Embedded SQLite storage for the daftar fee-collection ledgers: per-student
//! transport fees, per-participant event contributions, principal
//! disbursements and teacher debt records.
//!
//! The crate exposes a synchronous [`Database`] handle that wraps a
//! `rusqlite::Connection` and provides typed CRUD helpers for every domain
//! model. Opening a database always creates the schema if missing and runs
//! the orphan reconciler before the handle is handed out.
//!
//! All monetary values are fixed-point minor units (`i64`); floats never
//! enter the store.

pub mod backup;
pub mod buses;
pub mod database;
pub mod event_payments;
pub mod events;
pub mod models;
pub mod participants;
pub mod payments;
pub mod principal;
pub mod reconcile;
pub mod schema;
pub mod stats;
pub mod students;
pub mod teacher_debt;
pub mod validate;

mod error;

pub use database::Database;
pub use error::{Result, StoreError};
pub use models::*;
