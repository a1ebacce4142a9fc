//! In-memory loan table
//!
//! A [`LoanTable`] is an ordered list of rows indexed by loan `id`. Each row
//! is a column map, so batches with different column sets can be combined
//! the same way dataframe concatenation would.

pub mod columns;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashSet};

/// One row of the table, keyed by loan id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRow {
    pub id: u64,

    #[serde(flatten)]
    pub columns: Map<String, Value>,
}

impl LoanRow {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            columns: Map::new(),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.columns.insert(column.into(), value.into());
    }

    pub fn remove(&mut self, column: &str) -> Option<Value> {
        self.columns.remove(column)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    /// Posting timestamp, if the row carries a parseable one
    pub fn posted_date(&self) -> Option<DateTime<Utc>> {
        self.get(columns::POSTED_DATE)
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|d| d.with_timezone(&Utc))
    }

    pub fn days_available(&self) -> Option<i64> {
        self.get(columns::DAYS_AVAILABLE).and_then(Value::as_i64)
    }

    /// The row as a single JSON object including `id`
    pub fn to_object(&self) -> Map<String, Value> {
        let mut object = self.columns.clone();
        object.insert(columns::ID.to_string(), Value::from(self.id));
        object
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanTable {
    rows: Vec<LoanRow>,
}

impl LoanTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<LoanRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push(&mut self, row: LoanRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[LoanRow] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [LoanRow] {
        &mut self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &LoanRow> {
        self.rows.iter()
    }

    pub fn into_rows(self) -> Vec<LoanRow> {
        self.rows
    }

    pub fn ids(&self) -> Vec<u64> {
        self.rows.iter().map(|r| r.id).collect()
    }

    /// First row with the given id
    pub fn get(&self, id: u64) -> Option<&LoanRow> {
        self.rows.iter().find(|r| r.id == id)
    }

    /// Union of all column names, sorted; `id` is not included
    pub fn column_names(&self) -> Vec<String> {
        let names: BTreeSet<&String> = self.rows.iter().flat_map(|r| r.columns.keys()).collect();
        names.into_iter().cloned().collect()
    }

    /// Remove the named columns from every row. Unknown names are ignored.
    pub fn drop_columns(&mut self, names: &[&str]) {
        for row in &mut self.rows {
            for name in names {
                row.columns.remove(*name);
            }
        }
    }

    /// Keep the first row for each id, preserving order. Returns the number
    /// of rows removed.
    pub fn dedup_by_id(&mut self) -> usize {
        let before = self.rows.len();
        let mut seen = HashSet::with_capacity(before);
        self.rows.retain(|row| seen.insert(row.id));
        before - self.rows.len()
    }

    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&LoanRow) -> bool,
    {
        self.rows.retain(keep);
    }

    /// Append tables in order without deduplicating
    pub fn concat<I>(tables: I) -> Self
    where
        I: IntoIterator<Item = LoanTable>,
    {
        let rows = tables.into_iter().flat_map(|t| t.rows).collect();
        Self { rows }
    }
}

impl FromIterator<LoanRow> for LoanTable {
    fn from_iter<T: IntoIterator<Item = LoanRow>>(iter: T) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for LoanTable {
    type Item = LoanRow;
    type IntoIter = std::vec::IntoIter<LoanRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}
