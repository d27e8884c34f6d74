//! Defensive coercion of untrusted JSON into a fully typed [`Ledger`].
//!
//! Two entry points share the same per-record rules. [`lenient`] backs
//! loading persisted state and never fails. [`strict`] backs import and
//! only rejects a payload without a `students` array. Missing or duplicate
//! ids are assigned by [`Ledger::ensure_unique_ids`].

use serde_json::{Map, Value};
use tracing::warn;

use crate::errors::LedgerError;

use super::{Ledger, Payment, Student};

const STUDENTS_FIELD: &str = "students";
const PAYMENTS_FIELD: &str = "payments";

/// Replaces NaN and infinities with zero.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Numeric coercion: finite numbers pass, numeric strings parse, booleans map
/// to 1/0, everything else (including blanks) becomes 0.
pub fn coerce_number(value: Option<&Value>) -> f64 {
    let raw = match value {
        Some(Value::Number(number)) => number.as_f64().unwrap_or(0.0),
        Some(Value::String(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().unwrap_or(0.0)
            }
        }
        Some(Value::Bool(true)) => 1.0,
        _ => 0.0,
    };
    finite_or_zero(raw)
}

/// Truthiness: `false`, `0`, `""` and `null` are false; objects and arrays are true.
pub fn coerce_bool(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().map_or(false, |n| n != 0.0 && !n.is_nan()),
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Strings pass through, numbers are rendered, everything else is empty.
pub fn coerce_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        _ => String::new(),
    }
}

fn payment_from_map(map: &Map<String, Value>) -> Payment {
    Payment {
        id: coerce_string(map.get("id")),
        amount: coerce_number(map.get("amount")),
        date: coerce_string(map.get("date")),
        note: coerce_string(map.get("note")),
    }
}

fn student_from_map(map: &Map<String, Value>, payments: Vec<Payment>) -> Student {
    Student {
        id: coerce_string(map.get("id")),
        name: coerce_string(map.get("name")),
        class_name: coerce_string(map.get("className")),
        total_fee: coerce_number(map.get("totalFee")),
        free: coerce_bool(map.get("free")),
        payments,
    }
}

/// Builds a ledger from persisted state, degrading to an empty ledger when the
/// root shape is wrong. Non-object students and payments are dropped.
pub fn lenient(root: &Value) -> Ledger {
    lenient_with_rekeys(root).0
}

/// Same as [`lenient`], also returning how many ids had to be assigned.
/// A non-zero count means the source differs from the returned ledger.
pub fn lenient_with_rekeys(root: &Value) -> (Ledger, usize) {
    let Some(entries) = root.get(STUDENTS_FIELD).and_then(Value::as_array) else {
        warn!("persisted ledger has no students array, starting empty");
        return (Ledger::default(), 0);
    };

    let mut students = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let Some(map) = entry.as_object() else {
            warn!(index, "dropping persisted student that is not an object");
            continue;
        };
        let payments = match map.get(PAYMENTS_FIELD).and_then(Value::as_array) {
            Some(items) => items
                .iter()
                .filter_map(Value::as_object)
                .map(payment_from_map)
                .collect(),
            None => Vec::new(),
        };
        students.push(student_from_map(map, payments));
    }

    let mut ledger = Ledger { students };
    let rekeyed = ledger.ensure_unique_ids();
    (ledger, rekeyed)
}

/// Checks the root shape, then builds the ledger with the same repairs as
/// [`lenient`].
pub fn strict(root: &Value) -> Result<Ledger, LedgerError> {
    validate(root)?;
    Ok(lenient(root))
}

fn validate(root: &Value) -> Result<(), LedgerError> {
    let Some(object) = root.as_object() else {
        return Err(LedgerError::InvalidImport(
            "payload must be a JSON object".into(),
        ));
    };
    match object.get(STUDENTS_FIELD) {
        Some(Value::Array(_)) => Ok(()),
        Some(_) => Err(LedgerError::InvalidImport(
            "`students` must be an array".into(),
        )),
        None => Err(LedgerError::InvalidImport(
            "missing `students` array".into(),
        )),
    }
}
