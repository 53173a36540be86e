//! Tab-separated fixture files.
//!
//! Writing flattens records to a fixed header; reading is tolerant: a row
//! that does not deserialize into the requested view (missing required
//! columns, empty identifiers, unparsable numbers) is skipped and counted.

use crate::record::Record;
use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// How the header of a file is derived from its records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnOrder {
    /// Keys of the first record, in insertion order (homogeneous entities)
    FirstRecord,
    /// Alphabetically sorted union of all keys (heterogeneous entities)
    Sorted,
}

/// Header for `records` under the given ordering policy
pub fn columns(records: &[Record], order: ColumnOrder) -> Vec<&'static str> {
    match order {
        ColumnOrder::FirstRecord => records
            .first()
            .map(|r| r.keys().collect())
            .unwrap_or_default(),
        ColumnOrder::Sorted => {
            let all: BTreeSet<&'static str> = records.iter().flat_map(|r| r.keys()).collect();
            all.into_iter().collect()
        }
    }
}

/// Write `records` to `path`, returning the number of data rows.
///
/// When `records` is empty the file still gets a header, taken from
/// `empty_header`.
pub fn write_table(
    path: &Path,
    records: &[Record],
    order: ColumnOrder,
    empty_header: &[&str],
) -> anyhow::Result<usize> {
    let header: Vec<&str> = if records.is_empty() {
        empty_header.to_vec()
    } else {
        columns(records, order)
    };

    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(BufWriter::new(file));

    writer
        .write_record(&header)
        .with_context(|| format!("Failed to write header to {}", path.display()))?;

    for record in records {
        let row: Vec<String> = header.iter().map(|col| record.cell(col)).collect();
        writer
            .write_record(&row)
            .with_context(|| format!("Failed to write row to {}", path.display()))?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;
    Ok(records.len())
}

/// Write a file holding only a header line
pub fn write_header_only(path: &Path, header: &[&str]) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut out = BufWriter::new(file);
    writeln!(out, "{}", header.join("\t"))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    out.flush()?;
    Ok(())
}

/// Rows read back from a fixture file
#[derive(Debug)]
pub struct TableRows<T> {
    pub rows: Vec<T>,
    /// Rows that lacked required columns or failed to parse
    pub skipped: usize,
}

/// Read `path` into rows of `T`.
///
/// Returns `Ok(None)` when the file does not exist so callers can fall back
/// to placeholders.
pub fn read_table<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Option<TableRows<T>>> {
    if !path.exists() {
        return Ok(None);
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read header: {}", path.display()))?
        .clone();

    let mut rows = Vec::new();
    let mut skipped = 0;
    for result in reader.records() {
        let Ok(mut record) = result else {
            skipped += 1;
            continue;
        };
        // Short rows get empty trailing cells
        while record.len() < headers.len() {
            record.push_field("");
        }
        match record.deserialize::<T>(Some(&headers)) {
            Ok(row) => rows.push(row),
            Err(_) => skipped += 1,
        }
    }

    Ok(Some(TableRows { rows, skipped }))
}

/// Serde helper rejecting empty cells for identifier columns
pub fn required<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    if value.trim().is_empty() {
        return Err(serde::de::Error::custom("required column is empty"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[derive(Debug, Deserialize)]
    struct Row {
        #[serde(deserialize_with = "required")]
        id: String,
        #[serde(default)]
        city: String,
    }

    #[test]
    fn test_sorted_columns_union() {
        let records = vec![
            Record::new().with("b", 1i64).with("a", 2i64),
            Record::new().with("c", 3i64),
        ];
        assert_eq!(columns(&records, ColumnOrder::Sorted), vec!["a", "b", "c"]);
        assert_eq!(columns(&records, ColumnOrder::FirstRecord), vec!["b", "a"]);
    }

    #[test]
    fn test_missing_values_written_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.tsv");
        let records = vec![
            Record::new().with("id", "A").with("x", 1i64),
            Record::new().with("id", "B"),
        ];
        write_table(&path, &records, ColumnOrder::Sorted, &[]).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "id\tx\nA\t1\nB\t\n");
    }

    #[test]
    fn test_empty_table_gets_fallback_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.tsv");
        write_table(&path, &[], ColumnOrder::Sorted, &["id", "kind"]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "id\tkind\n");
    }

    #[test]
    fn test_read_skips_malformed_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rows.tsv");
        std::fs::write(&path, "id\tcity\nA\tBoston\n\tNowhere\nC\n").unwrap();

        let table = read_table::<Row>(&path).unwrap().unwrap();
        let ids: Vec<_> = table.rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "C"]);
        assert_eq!(table.rows[0].city, "Boston");
        assert_eq!(table.skipped, 1);
    }

    #[test]
    fn test_short_rows_keep_required_columns() {
        #[derive(Debug, Deserialize)]
        struct Wide {
            #[serde(deserialize_with = "required")]
            id: String,
            #[serde(default)]
            city: String,
            #[serde(default)]
            zip: String,
        }

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("short.tsv");
        std::fs::write(&path, "id\tcity\tzip\nA\tBoston\t02101\nB\tDenver\nC\n").unwrap();

        let table = read_table::<Wide>(&path).unwrap().unwrap();
        assert_eq!(table.skipped, 0);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[1].city, "Denver");
        assert_eq!(table.rows[1].zip, "");
        assert_eq!(table.rows[2].id, "C");
        assert_eq!(table.rows[2].city, "");
    }

    #[test]
    fn test_missing_required_column_skips_every_row() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rows.tsv");
        std::fs::write(&path, "city\nBoston\nDenver\n").unwrap();

        let table = read_table::<Row>(&path).unwrap().unwrap();
        assert!(table.rows.is_empty());
        assert_eq!(table.skipped, 2);
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let result = read_table::<Row>(&dir.path().join("absent.tsv")).unwrap();
        assert!(result.is_none());
    }
}
