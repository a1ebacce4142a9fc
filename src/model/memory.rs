//! Feature source over an in-memory table

use super::{FeatureFrame, FeatureSource};
use crate::error::Result;
use crate::sql::{LoanQuery, RowFilter};
use crate::table::columns;
use crate::table::{LoanRow, LoanTable};
use crate::transform::dates::midnight;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::debug;

/// Answers [`LoanQuery`]s from a loaded table with the same row semantics
/// as the rendered SQL
pub struct MemorySource {
    table: LoanTable,
}

impl MemorySource {
    pub fn new(table: LoanTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &LoanTable {
        &self.table
    }

    /// Latest posting among loans listed for exactly `days` days
    fn baseline(&self, days: i64) -> Option<DateTime<Utc>> {
        self.table
            .iter()
            .filter(|row| row.days_available() == Some(days))
            .filter_map(LoanRow::posted_date)
            .max()
    }

    fn select(&self, query: &LoanQuery) -> Vec<&LoanRow> {
        match &query.filter {
            RowFilter::All => self.table.iter().collect(),
            RowFilter::PostedBetween(window) => self
                .table
                .iter()
                .filter(|row| row.posted_date().is_some_and(|d| window.contains(d)))
                .collect(),
            RowFilter::AfterPolicyBaseline {
                days_available,
                before,
            } => {
                let Some(baseline) = self.baseline(*days_available) else {
                    return Vec::new();
                };
                let cutoff = midnight(*before);
                self.table
                    .iter()
                    .filter(|row| {
                        row.posted_date()
                            .is_some_and(|d| d > baseline && d < cutoff)
                    })
                    .collect()
            }
        }
    }
}

fn project(row: &LoanRow, selected: &[String]) -> Map<String, Value> {
    selected
        .iter()
        .map(|name| {
            let value = if name == columns::ID {
                Value::from(row.id)
            } else {
                row.get(name).cloned().unwrap_or(Value::Null)
            };
            (name.clone(), value)
        })
        .collect()
}

#[async_trait]
impl FeatureSource for MemorySource {
    async fn load(&self, query: &LoanQuery) -> Result<FeatureFrame> {
        query.validate()?;

        let rows: Vec<Map<String, Value>> = self
            .select(query)
            .into_iter()
            .map(|row| project(row, &query.columns))
            .collect();

        debug!("Memory source matched {} rows", rows.len());
        Ok(FeatureFrame::new(query.columns.clone(), rows))
    }
}
