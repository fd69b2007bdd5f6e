//! Comma-separated text decoding

use csv::ReaderBuilder;
use serde_json::Value;
use std::fs::File;
use std::path::Path;

use super::Record;
use crate::error::DecodeError;

/// Parse a CSV file with a header row into string-valued records.
///
/// Rows with a different field count than the header are errors, as is
/// invalid UTF-8. A repeated header name keeps the last column's value.
pub fn decode_csv(path: &Path) -> Result<Vec<Record>, DecodeError> {
    let file = File::open(path).map_err(csv::Error::from)?;
    let mut reader = ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(true)
        .from_reader(file);

    let headers = reader.headers()?.clone();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let record: Record = headers
            .iter()
            .zip(row.iter())
            .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
            .collect();
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_header_order_is_kept() {
        let (_dir, path) = write("zeta,alpha,mid\n1,2,3\n4,5,6\n");
        let records = decode_csv(&path).unwrap();
        assert_eq!(records.len(), 2);
        let keys: Vec<_> = records[0].keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(records[1]["mid"], Value::String("6".to_string()));
    }

    #[test]
    fn test_single_row() {
        let (_dir, path) = write("a,b\n1,2\n");
        let json = serde_json::to_value(decode_csv(&path).unwrap()).unwrap();
        assert_eq!(json, serde_json::json!([{"a": "1", "b": "2"}]));
    }

    #[test]
    fn test_quoted_fields() {
        let (_dir, path) = write("name,note\n\"Smith, J\",\"said \"\"hi\"\"\"\n");
        let records = decode_csv(&path).unwrap();
        assert_eq!(records[0]["name"], "Smith, J");
        assert_eq!(records[0]["note"], "said \"hi\"");
    }

    #[test]
    fn test_header_only_gives_no_records() {
        let (_dir, path) = write("a,b\n");
        assert!(decode_csv(&path).unwrap().is_empty());
    }

    #[test]
    fn test_ragged_row_is_error() {
        let (_dir, path) = write("a,b\n1,2,3\n");
        assert!(matches!(decode_csv(&path), Err(DecodeError::Csv(_))));
    }

    #[test]
    fn test_invalid_utf8_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, b"a,b\n\xff\xfe,2\n").unwrap();
        assert!(decode_csv(&path).is_err());
    }
}
