//! Feature queries against the loan table
//!
//! [`LoanQuery`] describes what the model step reads: a column list and a
//! filter on `posted_date`. It renders to SQL for the database store and is
//! evaluated directly by the in-memory source.

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;

use crate::error::{PipelineError, Result};
use crate::table::columns;
use crate::table::LoanTable;
use crate::transform::DateWindow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Columns the funding model is trained on
pub const DEFAULT_FEATURE_COLUMNS: &[&str] = &[
    "activity",
    "bonus_credit_eligibility",
    "loan_amount",
    "sector",
    "use",
    "repayment_interval",
    "repayment_term",
    "currency_loss",
    "country",
    "group_size",
    "gender",
    "desc_text_len",
    "use_text_len",
    "expired",
    "anonymous",
    "theme: Health",
    "theme: Green",
    "theme: none",
];

pub fn default_feature_columns() -> Vec<String> {
    DEFAULT_FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect()
}

/// Which rows a query selects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowFilter {
    All,
    /// Posted strictly inside the window
    PostedBetween(DateWindow),
    /// Posted after the last loan that was listed for `days_available`
    /// days, and before `before`
    AfterPolicyBaseline { days_available: i64, before: NaiveDate },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanQuery {
    pub table: String,
    pub columns: Vec<String>,
    pub filter: RowFilter,
}

impl LoanQuery {
    /// Select the default feature columns from every row of `table`
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: default_feature_columns(),
            filter: RowFilter::All,
        }
    }

    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_filter(mut self, filter: RowFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_table_name(&self.table)?;
        if self.columns.is_empty() {
            return Err(PipelineError::query("query selects no columns"));
        }
        Ok(())
    }

    pub fn where_clause(&self) -> Option<String> {
        let posted = quote_ident(columns::POSTED_DATE);
        match &self.filter {
            RowFilter::All => None,
            RowFilter::PostedBetween(window) => Some(format!(
                "WHERE {posted} > {} AND {posted} < {}",
                utc_literal(window.after),
                utc_literal(window.before)
            )),
            RowFilter::AfterPolicyBaseline {
                days_available,
                before,
            } => Some(format!(
                "WHERE {posted} > (SELECT max({posted}) FROM {} WHERE {} = {days_available}) \
                 AND {posted} < {}",
                self.table,
                quote_ident(columns::DAYS_AVAILABLE),
                utc_literal(*before),
            )),
        }
    }

    pub fn to_sql(&self) -> Result<String> {
        self.validate()?;
        let select = self
            .columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");

        let mut sql = format!("SELECT {select} FROM {}", self.table);
        if let Some(clause) = self.where_clause() {
            sql.push(' ');
            sql.push_str(&clause);
        }
        Ok(sql)
    }
}

/// Midnight UTC as a timestamp literal, independent of the session time zone
pub fn utc_literal(date: NaiveDate) -> String {
    format!("'{}T00:00:00Z'", date)
}

/// Quote an identifier so names like `theme: Health` survive
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Table names are interpolated into SQL, so only plain (optionally
/// schema-qualified) identifiers are accepted
pub fn validate_table_name(name: &str) -> Result<()> {
    let valid_part = |part: &str| {
        let mut chars = part.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    };

    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() <= 2 && parts.iter().all(|p| valid_part(p)) {
        Ok(())
    } else {
        Err(PipelineError::query(format!("invalid table name '{name}'")))
    }
}

/// SQL column types for a table, inferred from the first non-null value of
/// each column. `id` comes first and is the primary key.
pub fn column_types(table: &LoanTable) -> Vec<(String, &'static str)> {
    let mut types: BTreeMap<String, Option<&'static str>> = BTreeMap::new();

    for row in table.iter() {
        for (name, value) in &row.columns {
            let entry = types.entry(name.clone()).or_insert(None);
            if entry.is_none() && !value.is_null() {
                *entry = Some(sql_type(name, value));
            }
        }
    }

    let mut out = vec![(columns::ID.to_string(), "BIGINT PRIMARY KEY")];
    out.extend(types.into_iter().map(|(name, ty)| {
        let ty = ty.unwrap_or_else(|| sql_type(&name, &Value::Null));
        (name, ty)
    }));
    out
}

fn sql_type(name: &str, value: &Value) -> &'static str {
    if name == columns::POSTED_DATE {
        return "TIMESTAMPTZ";
    }
    match value {
        Value::Bool(_) => "BOOLEAN",
        Value::Number(n) if n.is_f64() => "DOUBLE PRECISION",
        Value::Number(_) => "BIGINT",
        Value::Array(_) | Value::Object(_) => "JSONB",
        Value::String(_) | Value::Null => "TEXT",
    }
}

/// `CREATE TABLE` statement for storing `table` under `name`
pub fn create_table_sql(name: &str, table: &LoanTable) -> Result<String> {
    validate_table_name(name)?;
    let definitions = column_types(table)
        .into_iter()
        .map(|(column, ty)| format!("{} {ty}", quote_ident(&column)))
        .collect::<Vec<_>>()
        .join(", ");
    Ok(format!("CREATE TABLE IF NOT EXISTS {name} ({definitions})"))
}
