//! Raw loan records as delivered by the upstream source
//!
//! Only the attributes the pipeline reshapes are typed. Everything else is
//! kept verbatim in [`RawLoan::extra`] and passes through to the table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One line of a source file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoanBatch {
    pub loans: Vec<RawLoan>,
}

/// A single crowdfunded loan listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawLoan {
    pub id: u64,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<Description>,

    #[serde(default)]
    pub terms: Option<Terms>,

    #[serde(default)]
    pub location: Option<Location>,

    #[serde(default)]
    pub borrowers: Vec<Borrower>,

    #[serde(default)]
    pub image: Option<Image>,

    #[serde(default)]
    pub partner_id: Option<u64>,

    pub posted_date: DateTime<Utc>,

    #[serde(default)]
    pub planned_expiration_date: Option<DateTime<Utc>>,

    /// Attributes the pipeline does not reshape
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Listing description, keyed by language code
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Description {
    #[serde(default)]
    pub languages: Vec<String>,

    #[serde(default)]
    pub texts: BTreeMap<String, String>,
}

impl Description {
    pub fn english(&self) -> Option<&str> {
        self.texts.get("en").map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Terms {
    #[serde(default)]
    pub repayment_interval: Option<String>,

    /// Term length in months
    #[serde(default)]
    pub repayment_term: Option<u32>,

    #[serde(default)]
    pub loss_liability: Option<LossLiability>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LossLiability {
    #[serde(default)]
    pub currency_exchange: Option<String>,

    #[serde(default)]
    pub nonpayment: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub country_code: Option<String>,

    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Borrower {
    #[serde(default)]
    pub first_name: Option<String>,

    #[serde(default)]
    pub gender: Option<String>,

    #[serde(default)]
    pub pictured: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Image {
    #[serde(default)]
    pub id: Option<u64>,

    #[serde(default)]
    pub template_id: Option<u64>,
}
