//! Tabular roster exchange: bulk registration rows, the blank template, and
//! the fee report sheet.
//!
//! Rows arrive already parsed (header -> cell text). Headers are matched
//! against English and Somali aliases so sheets produced by either template
//! are accepted.

use std::{
    collections::HashMap,
    io::{Read, Write},
};

use serde_json::Value;
use tracing::{debug, info};

use crate::{
    core::{services::ReportRow, LedgerStore},
    errors::LedgerError,
    ledger::{normalize::coerce_number, NewStudent},
};

const NAME_HEADERS: &[&str] = &["Name", "Magac", "MAGAC", "Magaca Ardayga", "magaca"];
const CLASS_HEADERS: &[&str] = &["Class", "Fasalka", "FASAL"];
const FEE_HEADERS: &[&str] = &["TotalFee", "LacagtaGuud", "Lacagta Guud", "Lacagta"];
const FREE_HEADERS: &[&str] = &["Free", "Bilaash", "free", "FREE"];

const TRUTHY: &[&str] = &["true", "yes", "haa", "ha", "1", "bilaash", "free"];

pub const TEMPLATE_HEADERS: [&str; 4] = ["Name", "Class", "TotalFee", "Free"];

/// Report sheet headers; money columns carry the currency code, e.g. `Paid (USD)`.
pub fn report_headers(currency: &str) -> [String; 6] {
    let money = |label: &str| {
        let code = currency.trim();
        if code.is_empty() {
            label.to_string()
        } else {
            format!("{label} ({code})")
        }
    };
    [
        "Name".to_string(),
        "Class".to_string(),
        money("Total Fee"),
        money("Paid"),
        money("Remaining"),
        "Status".to_string(),
    ]
}

/// One registration line lifted from a sheet, still as raw cell text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RosterRow {
    pub name: String,
    pub class_name: String,
    pub total_fee: String,
    pub free: String,
}

impl RosterRow {
    /// Picks the first alias with a non-blank cell for name, class and fee,
    /// and the first alias present at all for the free flag.
    pub fn from_record(record: &HashMap<String, String>) -> Self {
        let first_filled = |aliases: &[&str]| {
            aliases
                .iter()
                .filter_map(|alias| record.get(*alias))
                .find(|value| !value.trim().is_empty())
                .cloned()
                .unwrap_or_default()
        };
        let free = FREE_HEADERS
            .iter()
            .find_map(|alias| record.get(*alias))
            .cloned()
            .unwrap_or_default();
        Self {
            name: first_filled(NAME_HEADERS),
            class_name: first_filled(CLASS_HEADERS),
            total_fee: first_filled(FEE_HEADERS),
            free,
        }
    }

    /// `None` when name or class is blank. Exempt rows carry no fee and
    /// unreadable fees become zero.
    pub fn to_new_student(&self) -> Option<NewStudent> {
        let name = self.name.trim();
        let class_name = self.class_name.trim();
        if name.is_empty() || class_name.is_empty() {
            return None;
        }
        let free = is_truthy(&self.free);
        let total_fee = if free {
            0.0
        } else {
            coerce_number(Some(&Value::String(self.total_fee.clone())))
        };
        Some(NewStudent {
            name: name.to_string(),
            class_name: class_name.to_string(),
            total_fee,
            free,
        })
    }
}

/// Free-flag truthiness for sheet cells, in English and Somali.
pub fn is_truthy(value: &str) -> bool {
    let normalized = value.trim().to_lowercase();
    TRUTHY.contains(&normalized.as_str())
}

/// Adds every usable row as a new student in a single write and returns how
/// many were added. A failed write registers none of them.
pub fn register_rows(store: &mut LedgerStore, rows: &[RosterRow]) -> Result<usize, LedgerError> {
    let students: Vec<NewStudent> = rows
        .iter()
        .enumerate()
        .filter_map(|(index, row)| {
            let student = row.to_new_student();
            if student.is_none() {
                debug!(index, "skipping roster row without name or class");
            }
            student
        })
        .collect();
    let added = store.add_students(students)?.len();
    info!(added, skipped = rows.len() - added, "roster registered");
    Ok(added)
}

/// Reads a headed CSV roster.
pub fn read_roster_csv<R: Read>(reader: R) -> Result<Vec<RosterRow>, LedgerError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let cells: HashMap<String, String> = headers
            .iter()
            .zip(record.iter())
            .map(|(header, cell)| (header.to_string(), cell.to_string()))
            .collect();
        rows.push(RosterRow::from_record(&cells));
    }
    Ok(rows)
}

/// Writes the blank registration template with two sample rows.
pub fn write_template_csv<W: Write>(writer: W) -> Result<(), LedgerError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(TEMPLATE_HEADERS)?;
    csv_writer.write_record(["Xasan Cali", "Fasal 7", "120", "false"])?;
    csv_writer.write_record(["Maryan Axmed", "Fasal 8", "0", "true"])?;
    csv_writer.flush()?;
    Ok(())
}

/// Writes report rows as a sheet, labelling amounts with `currency`.
pub fn write_report_csv<W: Write>(
    writer: W,
    rows: &[ReportRow],
    currency: &str,
) -> Result<(), LedgerError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(report_headers(currency))?;
    for row in rows {
        csv_writer.write_record([
            row.name.clone(),
            row.class_name.clone(),
            row.total_fee.to_string(),
            row.paid.to_string(),
            row.remaining.to_string(),
            row.status.to_string(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}
