//! Raw records to model-ready table
//!
//! `build_table` runs the full normalization:
//!
//! 1. drop attributes produced after funding
//! 2. flatten repayment terms and borrower info
//! 3. derive `days_available` from the posting and expiration dates
//! 4. keep only loans posted inside the date window
//! 5. keep or drop the listing details depending on [`Mode`]

pub mod dates;
pub mod flatten;

pub use dates::{days_between, DateWindow};

use crate::error::Result;
use crate::features;
use crate::ingest;
use crate::record::RawLoan;
use crate::table::columns;
use crate::table::{LoanRow, LoanTable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// Which column set the table is built for
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Structured attributes only
    #[default]
    Simple,
    /// Also keeps name, partner, image id and English description
    Complex,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Simple => write!(f, "simple"),
            Mode::Complex => write!(f, "complex"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "simple" => Ok(Mode::Simple),
            "complex" => Ok(Mode::Complex),
            other => Err(format!("unknown mode '{other}' (expected simple or complex)")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOptions {
    #[serde(default)]
    pub mode: Mode,

    #[serde(default)]
    pub window: DateWindow,

    /// Add the derived model columns (`expired`, text lengths, theme flags)
    #[serde(default)]
    pub derive_features: bool,
}

impl BuildOptions {
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_window(mut self, window: DateWindow) -> Self {
        self.window = window;
        self
    }

    pub fn with_features(mut self, derive_features: bool) -> Self {
        self.derive_features = derive_features;
        self
    }
}

/// Flatten one record into a row. Pass-through attributes are kept apart
/// from the post-funding ones.
pub fn flatten_loan(mut loan: RawLoan, options: &BuildOptions) -> LoanRow {
    let mut row = LoanRow::new(loan.id);

    if options.derive_features {
        features::derive_features(&loan, &mut row);
    }
    if options.mode == Mode::Complex {
        flatten::listing_detail(&mut row, &loan);
    }

    flatten::payment_terms(&mut row, loan.terms.as_ref());
    flatten::borrower_info(&mut row, loan.location.as_ref(), &loan.borrowers);
    flatten::transform_dates(&mut row, loan.posted_date, loan.planned_expiration_date);

    for name in columns::POST_FUNDING {
        loan.extra.remove(*name);
    }
    for (name, value) in std::mem::take(&mut loan.extra) {
        if !row.has_column(&name) {
            row.columns.insert(name, value);
        }
    }

    row
}

/// Drop rows posted outside the window. Returns how many were dropped.
pub fn filter_by_date(table: &mut LoanTable, window: &DateWindow) -> usize {
    let before = table.len();
    table.retain(|row| row.posted_date().is_some_and(|d| window.contains(d)));
    before - table.len()
}

/// Normalize raw records into a table indexed by loan id
pub fn build_table(records: Vec<RawLoan>, options: &BuildOptions) -> LoanTable {
    let input = records.len();

    let mut table: LoanTable = records
        .into_iter()
        .map(|loan| flatten_loan(loan, options))
        .collect();

    let duplicates = table.dedup_by_id();
    let outside = filter_by_date(&mut table, &options.window);
    debug!(
        "Dropped {} duplicate and {} out-of-window loans",
        duplicates, outside
    );

    if options.derive_features {
        features::align_theme_columns(&mut table);
    }

    info!(
        "Built {} table: {} of {} loans kept",
        options.mode,
        table.len(),
        input
    );
    table
}

/// Import a directory of source files and build the table from it
pub fn build_from_dir(dir: &Path, options: &BuildOptions) -> Result<LoanTable> {
    let loans = ingest::import_loans(dir)?;
    Ok(build_table(loans, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn raw(value: Value) -> RawLoan {
        serde_json::from_value(value).unwrap()
    }

    fn sample(id: u64, posted: &str) -> RawLoan {
        raw(json!({
            "id": id,
            "name": "Ana",
            "description": {"languages": ["es", "en"], "texts": {"es": "hola", "en": "hello"}},
            "terms": {
                "repayment_interval": "Monthly",
                "repayment_term": 12,
                "loss_liability": {"currency_exchange": "none"}
            },
            "location": {"country_code": "PE"},
            "borrowers": [{"gender": "F"}],
            "image": {"id": 555, "template_id": 1},
            "partner_id": 9,
            "posted_date": posted,
            "planned_expiration_date": "2013-08-01T00:00:00Z",
            "sector": "Food",
            "funded_amount": 500,
            "lender_count": 12,
            "tags": [],
            "video": null
        }))
    }

    #[test]
    fn test_simple_mode_columns() {
        let table = build_table(
            vec![sample(1, "2013-07-02T00:00:00Z")],
            &BuildOptions::default(),
        );

        let row = table.get(1).unwrap();
        for absent in ["image", "name", "partner_id", "description"] {
            assert!(!row.has_column(absent), "{absent} should be dropped");
        }
        for dropped in ["terms", "borrowers", "location", "planned_expiration_date"] {
            assert!(!row.has_column(dropped), "{dropped} should be flattened away");
        }
        for dropped in columns::POST_FUNDING {
            assert!(!row.has_column(dropped));
        }
        assert_eq!(row.get("sector"), Some(&json!("Food")));
        assert_eq!(row.get("country"), Some(&json!("PE")));
        assert_eq!(row.get("days_available"), Some(&json!(30)));
    }

    #[test]
    fn test_complex_mode_columns() {
        let options = BuildOptions::default().with_mode(Mode::Complex);
        let table = build_table(vec![sample(1, "2013-07-02T00:00:00Z")], &options);

        let row = table.get(1).unwrap();
        assert_eq!(row.get("image"), Some(&json!(555)));
        assert_eq!(row.get("name"), Some(&json!("Ana")));
        assert_eq!(row.get("partner_id"), Some(&json!(9)));
        assert_eq!(row.get("description"), Some(&json!("hello")));
    }

    #[test]
    fn test_complex_mode_without_english_description() {
        let mut loan = sample(1, "2013-07-02T00:00:00Z");
        loan.description.as_mut().unwrap().texts.remove("en");

        let table = build_table(vec![loan], &BuildOptions::default().with_mode(Mode::Complex));
        assert_eq!(table.get(1).unwrap().get("description"), Some(&Value::Null));
    }

    #[test]
    fn test_build_filters_and_dedups() {
        let records = vec![
            sample(1, "2012-01-25T00:00:00Z"),
            sample(2, "2012-01-26T00:00:00Z"),
            sample(3, "2014-12-22T00:00:00Z"),
            sample(2, "2013-03-03T00:00:00Z"),
            sample(4, "2010-05-05T00:00:00Z"),
            sample(5, "2014-12-21T23:59:59Z"),
        ];
        let input = records.len();

        let table = build_table(records, &BuildOptions::default());
        assert!(table.len() <= input);
        assert_eq!(table.ids(), vec![2, 5]);
        assert_eq!(
            table.get(2).unwrap().get("posted_date"),
            Some(&json!("2012-01-26T00:00:00Z"))
        );
    }

    #[test]
    fn test_keeps_loans_posted_after_midnight_on_first_day() {
        let table = build_table(
            vec![
                sample(1, "2012-01-25T12:00:00Z"),
                sample(2, "2012-01-25T00:00:00Z"),
                sample(3, "2014-12-22T00:00:01Z"),
            ],
            &BuildOptions::default(),
        );
        assert_eq!(table.ids(), vec![1]);
    }

    #[test]
    fn test_missing_expiration_gives_null_days() {
        let mut loan = sample(1, "2013-07-02T00:00:00Z");
        loan.planned_expiration_date = None;

        let table = build_table(vec![loan], &BuildOptions::default());
        assert_eq!(table.get(1).unwrap().get("days_available"), Some(&Value::Null));
    }

    #[test]
    fn test_features_are_opt_in() {
        let plain = build_table(
            vec![sample(1, "2013-07-02T00:00:00Z")],
            &BuildOptions::default(),
        );
        assert!(!plain.get(1).unwrap().has_column("expired"));

        let with = build_table(
            vec![sample(1, "2013-07-02T00:00:00Z")],
            &BuildOptions::default().with_features(true),
        );
        let row = with.get(1).unwrap();
        assert_eq!(row.get("expired"), Some(&json!(false)));
        assert_eq!(row.get("desc_text_len"), Some(&json!(5)));
        assert_eq!(row.get("theme: none"), Some(&json!(true)));
        assert!(!row.has_column("description"));
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("simple".parse::<Mode>().unwrap(), Mode::Simple);
        assert_eq!("COMPLEX".parse::<Mode>().unwrap(), Mode::Complex);
        assert!("fancy".parse::<Mode>().is_err());
        assert_eq!(Mode::Complex.to_string(), "complex");
    }
}
