//! Flat record representation shared by every entity.
//!
//! Entities keep their own typed structs; on the way to disk they flatten
//! into a `Record`, an insertion-ordered property bag whose keys become TSV
//! columns.

use chrono::NaiveDate;

/// A single cell value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Empty,
    Int(i64),
    /// Monetary amount, rendered with two decimals
    Money(f64),
    /// Float rendered with a fixed number of decimals
    Decimal(f64, usize),
    Text(String),
    /// Rendered as `Y` / `N`
    Flag(bool),
    Date(NaiveDate),
}

impl FieldValue {
    pub fn decimal(value: f64, places: usize) -> Self {
        FieldValue::Decimal(value, places)
    }

    /// Format for a tab-separated cell
    pub fn to_tsv(&self) -> String {
        match self {
            FieldValue::Empty => String::new(),
            FieldValue::Int(n) => n.to_string(),
            FieldValue::Money(n) => format!("{:.2}", n),
            FieldValue::Decimal(n, places) => format!("{:.*}", places, n),
            FieldValue::Text(s) => escape_tsv(s),
            FieldValue::Flag(b) => if *b { "Y" } else { "N" }.to_string(),
            FieldValue::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

fn escape_tsv(s: &str) -> String {
    s.replace(['\t', '\n', '\r'], " ")
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<&String> for FieldValue {
    fn from(s: &String) -> Self {
        FieldValue::Text(s.clone())
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Int(n)
    }
}

impl From<u32> for FieldValue {
    fn from(n: u32) -> Self {
        FieldValue::Int(n as i64)
    }
}

impl From<u8> for FieldValue {
    fn from(n: u8) -> Self {
        FieldValue::Int(n as i64)
    }
}

impl From<usize> for FieldValue {
    fn from(n: usize) -> Self {
        FieldValue::Int(n as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Money(n)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Flag(b)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(d: NaiveDate) -> Self {
        FieldValue::Date(d)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Empty)
    }
}

/// Ordered property bag for one output row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(&'static str, FieldValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Set a field, replacing an existing value in place
    pub fn set(&mut self, key: &'static str, value: impl Into<FieldValue>) {
        let value = value.into();
        if let Some(slot) = self.fields.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.fields.push((key, value));
        }
    }

    /// Builder form of [`Record::set`]
    pub fn with(mut self, key: &'static str, value: impl Into<FieldValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Append every field of `other`
    pub fn extend(&mut self, other: Record) {
        for (key, value) in other.fields {
            self.set(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Column names in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(k, _)| *k)
    }

    /// Rendered cell for `key`, empty when the record has no such field
    pub fn cell(&self, key: &str) -> String {
        self.get(key).map(FieldValue::to_tsv).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Flatten a typed entity into a [`Record`]
pub trait ToRecord {
    fn to_record(&self) -> Record;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_rendering() {
        assert_eq!(FieldValue::Money(12.5).to_tsv(), "12.50");
        assert_eq!(FieldValue::decimal(40.712345678, 6).to_tsv(), "40.712346");
        assert_eq!(FieldValue::Flag(true).to_tsv(), "Y");
        assert_eq!(FieldValue::Empty.to_tsv(), "");
        assert_eq!(FieldValue::from(None::<u32>).to_tsv(), "");
        assert_eq!(FieldValue::from("a\tb").to_tsv(), "a b");
    }

    #[test]
    fn test_record_set_replaces_in_place() {
        let mut record = Record::new().with("id", "X-1").with("risk", 10u32);
        record.set("id", "X-2");
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["id", "risk"]);
        assert_eq!(record.cell("id"), "X-2");
        assert_eq!(record.cell("missing"), "");
    }
}
