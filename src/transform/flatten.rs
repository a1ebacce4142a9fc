//! Per-record extraction rules
//!
//! Each step lifts a few attributes out of a nested source object into flat
//! columns. An absent source field becomes a null column, never an error.

use super::dates::days_between;
use crate::record::{Borrower, Description, Image, Location, RawLoan, Terms};
use crate::table::columns;
use crate::table::LoanRow;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

/// Repayment interval, term length and currency-loss liability
pub fn payment_terms(row: &mut LoanRow, terms: Option<&Terms>) {
    let interval = terms.and_then(|t| t.repayment_interval.clone());
    let term = terms.and_then(|t| t.repayment_term);
    let currency_loss = terms
        .and_then(|t| t.loss_liability.as_ref())
        .and_then(|l| l.currency_exchange.clone());

    row.set(columns::REPAYMENT_INTERVAL, interval);
    row.set(columns::REPAYMENT_TERM, term);
    row.set(columns::CURRENCY_LOSS, currency_loss);
}

/// Country code, group size and the first listed borrower's gender
pub fn borrower_info(row: &mut LoanRow, location: Option<&Location>, borrowers: &[Borrower]) {
    let country = location.and_then(|l| l.country_code.clone());
    let gender = borrowers.first().and_then(|b| b.gender.clone());

    row.set(columns::COUNTRY, country);
    row.set(columns::GROUP_SIZE, borrowers.len());
    row.set(columns::GENDER, gender);
}

/// Posting timestamp and the number of days the listing is available
pub fn transform_dates(
    row: &mut LoanRow,
    posted: DateTime<Utc>,
    planned_expiration: Option<DateTime<Utc>>,
) {
    row.set(
        columns::POSTED_DATE,
        posted.to_rfc3339_opts(SecondsFormat::Secs, true),
    );
    row.set(
        columns::DAYS_AVAILABLE,
        planned_expiration.map(|end| days_between(posted, end)),
    );
}

/// English text of the description; null when there is none
pub fn english_description(description: Option<&Description>) -> Value {
    description
        .and_then(Description::english)
        .map(|text| Value::from(text.to_string()))
        .unwrap_or(Value::Null)
}

/// Listing details kept by the description-aware mode, with the image
/// reduced to its id
pub fn listing_detail(row: &mut LoanRow, loan: &RawLoan) {
    row.set(columns::NAME, loan.name.clone());
    row.set(columns::PARTNER_ID, loan.partner_id);
    row.set(columns::IMAGE, loan.image.as_ref().and_then(|i: &Image| i.id));
    row.set(columns::DESCRIPTION, english_description(loan.description.as_ref()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::LossLiability;
    use chrono::TimeZone;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn test_payment_terms_extracts_fields() {
        let terms = Terms {
            repayment_interval: Some("Irregularly".into()),
            repayment_term: Some(8),
            loss_liability: Some(LossLiability {
                currency_exchange: Some("shared".into()),
                nonpayment: Some("lender".into()),
            }),
            ..Default::default()
        };

        let mut row = LoanRow::new(1);
        payment_terms(&mut row, Some(&terms));
        assert_eq!(row.get("repayment_interval"), Some(&json!("Irregularly")));
        assert_eq!(row.get("repayment_term"), Some(&json!(8)));
        assert_eq!(row.get("currency_loss"), Some(&json!("shared")));
    }

    #[test]
    fn test_payment_terms_missing_is_null() {
        let mut row = LoanRow::new(1);
        payment_terms(&mut row, None);
        assert_eq!(row.get("repayment_interval"), Some(&Value::Null));
        assert_eq!(row.get("repayment_term"), Some(&Value::Null));
        assert_eq!(row.get("currency_loss"), Some(&Value::Null));
    }

    #[test]
    fn test_borrower_info_uses_first_borrower() {
        let borrowers = vec![
            Borrower {
                gender: Some("F".into()),
                ..Default::default()
            },
            Borrower {
                gender: Some("M".into()),
                ..Default::default()
            },
        ];
        let location = Location {
            country_code: Some("KE".into()),
            country: Some("Kenya".into()),
        };

        let mut row = LoanRow::new(1);
        borrower_info(&mut row, Some(&location), &borrowers);
        assert_eq!(row.get("country"), Some(&json!("KE")));
        assert_eq!(row.get("group_size"), Some(&json!(2)));
        assert_eq!(row.get("gender"), Some(&json!("F")));
    }

    #[test]
    fn test_borrower_info_without_borrowers() {
        let mut row = LoanRow::new(1);
        borrower_info(&mut row, None, &[]);
        assert_eq!(row.get("group_size"), Some(&json!(0)));
        assert_eq!(row.get("gender"), Some(&Value::Null));
        assert_eq!(row.get("country"), Some(&Value::Null));
    }

    #[test]
    fn test_transform_dates() {
        let posted = Utc.with_ymd_and_hms(2013, 5, 7, 19, 50, 2).unwrap();
        let expires = Utc.with_ymd_and_hms(2013, 6, 6, 19, 50, 2).unwrap();

        let mut row = LoanRow::new(1);
        transform_dates(&mut row, posted, Some(expires));
        assert_eq!(row.get("posted_date"), Some(&json!("2013-05-07T19:50:02Z")));
        assert_eq!(row.days_available(), Some(30));
        assert_eq!(row.posted_date(), Some(posted));
    }

    #[test]
    fn test_english_description() {
        let mut texts = BTreeMap::new();
        texts.insert("fr".to_string(), "bonjour".to_string());
        let french_only = Description {
            languages: vec!["fr".into()],
            texts: texts.clone(),
        };
        assert_eq!(english_description(Some(&french_only)), Value::Null);

        texts.insert("en".to_string(), "hello".to_string());
        let both = Description {
            languages: vec!["fr".into(), "en".into()],
            texts,
        };
        assert_eq!(english_description(Some(&both)), json!("hello"));
        assert_eq!(english_description(None), Value::Null);
    }
}
