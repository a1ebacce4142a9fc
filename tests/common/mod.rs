//! Common test utilities and helpers

#![allow(dead_code)]

use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// One raw loan record with the nested structure of the upstream dumps
pub fn raw_loan(id: u64, posted: &str, expires: Option<&str>) -> Value {
    json!({
        "id": id,
        "name": format!("Borrower {id}"),
        "status": "funded",
        "funded_amount": 500,
        "loan_amount": 500,
        "activity": "Farming",
        "sector": "Agriculture",
        "use": "to buy seeds",
        "description": {
            "languages": ["en"],
            "texts": { "en": "Grows maize with her family." }
        },
        "terms": {
            "repayment_interval": "Monthly",
            "repayment_term": 12,
            "loss_liability": { "currency_exchange": "shared", "nonpayment": "lender" },
            "disbursal_amount": 500
        },
        "location": { "country_code": "KE", "country": "Kenya" },
        "borrowers": [{ "first_name": "Amina", "gender": "F", "pictured": true }],
        "image": { "id": 1000 + id, "template_id": 1 },
        "partner_id": 7,
        "posted_date": posted,
        "planned_expiration_date": expires,
    })
}

/// Builder for a temporary directory of raw loan dumps
pub struct RawDirBuilder {
    temp_dir: TempDir,
    files: Vec<(String, Vec<Vec<Value>>)>,
}

impl RawDirBuilder {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("create temp dir"),
            files: Vec::new(),
        }
    }

    /// Add a file holding one batch line per entry of `lines`
    pub fn with_file(mut self, name: &str, lines: Vec<Vec<Value>>) -> Self {
        self.files.push((name.to_string(), lines));
        self
    }

    /// Add a non-loan file that must be ignored
    pub fn with_other(self, name: &str, content: &str) -> Self {
        fs::write(self.temp_dir.path().join(name), content).expect("write file");
        self
    }

    pub fn build(self) -> RawDir {
        for (name, lines) in &self.files {
            let content: Vec<String> = lines
                .iter()
                .map(|loans| json!({ "header": { "total": loans.len() }, "loans": loans }).to_string())
                .collect();
            fs::write(self.temp_dir.path().join(name), content.join("\n"))
                .expect("write batch file");
        }
        RawDir {
            temp_dir: self.temp_dir,
        }
    }
}

impl Default for RawDirBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct RawDir {
    temp_dir: TempDir,
}

impl RawDir {
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn join(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }
}

/// A directory with loans on both sides of both window boundaries (one at
/// the opening midnight, one half an hour later) and a duplicate across files
pub fn mixed_window_dir() -> RawDir {
    RawDirBuilder::new()
        .with_file(
            "1.json",
            vec![
                vec![
                    raw_loan(1, "2012-01-20T10:00:00Z", Some("2012-02-19T10:00:00Z")),
                    raw_loan(2, "2012-01-25T00:00:00Z", Some("2012-02-24T00:00:00Z")),
                    raw_loan(3, "2012-01-25T00:30:00Z", Some("2012-02-24T00:30:00Z")),
                ],
                vec![raw_loan(4, "2013-06-01T12:00:00Z", Some("2013-07-16T12:00:00Z"))],
            ],
        )
        .with_file(
            "2.json",
            vec![vec![
                raw_loan(4, "2013-06-01T12:00:00Z", Some("2013-07-16T12:00:00Z")),
                raw_loan(5, "2014-12-21T18:00:00Z", None),
                raw_loan(6, "2014-12-22T01:00:00Z", Some("2015-01-21T01:00:00Z")),
            ]],
        )
        .with_other("README.txt", "not a dump")
        .build()
}
