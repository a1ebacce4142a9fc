//! Derived model columns
//!
//! These are the inputs the downstream feature query selects beyond the
//! flattened attributes.

use crate::record::RawLoan;
use crate::table::columns;
use crate::table::{LoanRow, LoanTable};
use serde_json::Value;
use std::collections::BTreeSet;

const EXPIRED_STATUS: &str = "expired";
const ANONYMOUS_NAME: &str = "Anonymous";

/// Add derived columns for one loan. Must run before the loan's pass-through
/// attributes are moved into the row.
pub fn derive_features(loan: &RawLoan, row: &mut LoanRow) {
    let expired = loan
        .extra
        .get(columns::STATUS)
        .and_then(Value::as_str)
        .is_some_and(|s| s == EXPIRED_STATUS);

    let desc_text_len = loan
        .description
        .as_ref()
        .and_then(|d| d.english())
        .map(|t| t.chars().count())
        .unwrap_or(0);

    let use_text_len = loan
        .extra
        .get(columns::USE)
        .and_then(Value::as_str)
        .map(|t| t.chars().count())
        .unwrap_or(0);

    let anonymous = loan.name.as_deref() == Some(ANONYMOUS_NAME);

    row.set(columns::EXPIRED, expired);
    row.set(columns::DESC_TEXT_LEN, desc_text_len);
    row.set(columns::USE_TEXT_LEN, use_text_len);
    row.set(columns::ANONYMOUS, anonymous);

    let themes = themes_of(loan);
    if themes.is_empty() {
        row.set(columns::THEME_NONE, true);
    } else {
        for theme in themes {
            row.set(columns::theme_column(&theme), true);
        }
    }
}

fn themes_of(loan: &RawLoan) -> Vec<String> {
    match loan.extra.get(columns::THEMES) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Give every row every theme flag that appears anywhere in the table,
/// filling the missing ones with `false`
pub fn align_theme_columns(table: &mut LoanTable) {
    let theme_columns: BTreeSet<String> = table
        .column_names()
        .into_iter()
        .filter(|c| c.starts_with(columns::THEME_PREFIX))
        .collect();

    for row in table.rows_mut() {
        for column in &theme_columns {
            if !row.has_column(column) {
                row.set(column.clone(), false);
            }
        }
    }
}
