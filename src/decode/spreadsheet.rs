//! Workbook decoding (xlsx, xlsm, xlsb, xls, ods)
//!
//! Only the first sheet by position is read. Its first row is the header.

use calamine::{open_workbook_auto, Data, Reader};
use serde_json::{Number, Value};
use std::path::Path;

use super::{unique_headers, Record};
use crate::error::DecodeError;

/// Decode the first sheet of a workbook into records.
///
/// Empty cells are left out of a record and rows without any value are
/// skipped. Numbers keep their type; whole floats become integers.
pub fn decode_workbook(path: &Path) -> Result<Vec<Record>, DecodeError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| DecodeError::Spreadsheet(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(DecodeError::NoSheets)?
        .map_err(|e| DecodeError::Spreadsheet(e.to_string()))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Vec::new());
    };
    let headers = unique_headers(header_row.iter().map(header_text));

    let records = rows
        .filter_map(|row| {
            let record: Record = headers
                .iter()
                .zip(row.iter())
                .filter_map(|(key, cell)| cell_value(cell).map(|v| (key.clone(), v)))
                .collect();
            (!record.is_empty()).then_some(record)
        })
        .collect();

    Ok(records)
}

fn header_text(cell: &Data) -> String {
    match cell_value(cell) {
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// JSON value of a cell, `None` for empty cells
fn cell_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            Some(Value::String(s.clone()))
        }
        Data::Int(i) => Some(Value::from(*i)),
        Data::Float(f) => Some(number(*f)),
        Data::Bool(b) => Some(Value::Bool(*b)),
        Data::DateTime(dt) => Some(number(dt.as_f64())),
        Data::Error(e) => Some(Value::String(e.to_string())),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn number(f: f64) -> Value {
    if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Value::from(f as i64)
    } else {
        Number::from_f64(f).map_or(Value::Null, Value::Number)
    }
}
