//! # daftar-import
//!
//! Bulk CSV intake of student records for the daftar store.
//!
//! Recognized columns: `Name, Father Name, Class, Section, Bus, Stop, Phone,
//! Monthly Fee`. Rows without a `Name` are skipped silently. A `Bus` name
//! not present in the store creates a new bus with a zero default target;
//! the name-to-id mapping is cached (case-insensitively) for the remainder
//! of the batch, so repeated names create exactly one bus.

use std::collections::HashMap;
use std::path::Path;

use daftar_store::validate::{parse_amount, require_name};
use daftar_store::{Bus, Database, StoreError, Student};
use thiserror::Error;

/// Errors produced by the import path.
#[derive(Error, Debug)]
pub enum ImportError {
    /// Malformed CSV or unreadable file.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Store-level failure while inserting.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ImportError>;

/// Outcome of one import batch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportReport {
    /// Rows inserted as students.
    pub imported: usize,
    /// Rows dropped: missing name or unparsable monthly fee.
    pub skipped: usize,
}

/// Import students from a CSV file.
///
/// The monthly fee doubles as the student's initial `target_amount`;
/// `paid_amount` starts at zero.
pub fn import_students_csv(path: &Path, db: &Database) -> Result<ImportReport> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    // Bus name (lowercased) -> id, seeded from the store and extended as the
    // batch creates buses on the fly.
    let mut bus_map: HashMap<String, i64> = db
        .get_all_buses()?
        .into_iter()
        .map(|b| (b.name.to_lowercase(), b.id))
        .collect();

    let mut report = ImportReport::default();

    for record in reader.records() {
        let record = record?;
        let field = |name: &str| -> Option<&str> {
            headers
                .iter()
                .position(|h| h == name)
                .and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let name = match field("Name").map(require_name) {
            Some(Ok(name)) => name.to_string(),
            _ => {
                report.skipped += 1;
                continue;
            }
        };

        let monthly_fee = match field("Monthly Fee") {
            None => 0,
            Some(raw) => match parse_amount(raw) {
                Ok(fee) => fee,
                Err(e) => {
                    tracing::warn!(student = %name, error = %e, "row skipped");
                    report.skipped += 1;
                    continue;
                }
            },
        };

        let bus_id = match field("Bus") {
            None => None,
            Some(bus_name) => Some(resolve_bus(db, &mut bus_map, bus_name)?),
        };

        db.add_student(&Student {
            id: 0,
            name,
            father_name: field("Father Name").map(str::to_string),
            class_name: field("Class").map(str::to_string),
            section: field("Section").map(str::to_string),
            bus_id,
            bus_stop: field("Stop").map(str::to_string),
            phone: field("Phone").map(str::to_string),
            monthly_fee,
            target_amount: monthly_fee,
            paid_amount: 0,
        })?;
        report.imported += 1;
    }

    tracing::info!(
        imported = report.imported,
        skipped = report.skipped,
        "student import finished"
    );
    Ok(report)
}

/// Look up a bus by name, creating a zero-target bus for unknown names and
/// caching the mapping for the batch.
fn resolve_bus(
    db: &Database,
    bus_map: &mut HashMap<String, i64>,
    bus_name: &str,
) -> Result<i64> {
    let key = bus_name.to_lowercase();
    if let Some(id) = bus_map.get(&key) {
        return Ok(*id);
    }

    let id = db.add_bus(&Bus {
        id: 0,
        name: bus_name.to_string(),
        default_target: 0,
    })?;
    tracing::info!(bus = bus_name, id, "created bus for import row");
    bus_map.insert(key, id);
    Ok(id)
}
