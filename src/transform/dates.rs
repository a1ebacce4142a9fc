//! Date window policy and elapsed-day arithmetic

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Open interval between two UTC midnights. A record posted exactly at
/// either midnight is outside; one posted later on the `after` day is inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub after: NaiveDate,
    pub before: NaiveDate,
}

impl DateWindow {
    pub fn new(after: NaiveDate, before: NaiveDate) -> Self {
        Self { after, before }
    }

    /// The historical window the training data is restricted to.
    ///
    /// Starts when the listing expiration policy was fully in place and ends
    /// on the last day every loan in the dataset could still expire.
    pub fn policy() -> Self {
        Self {
            after: NaiveDate::from_ymd_opt(2012, 1, 25).unwrap_or(NaiveDate::MIN),
            before: NaiveDate::from_ymd_opt(2014, 12, 22).unwrap_or(NaiveDate::MIN),
        }
    }

    /// Midnight UTC opening the window
    pub fn start(&self) -> DateTime<Utc> {
        midnight(self.after)
    }

    /// Midnight UTC closing the window
    pub fn end(&self) -> DateTime<Utc> {
        midnight(self.before)
    }

    pub fn contains(&self, posted: DateTime<Utc>) -> bool {
        posted > self.start() && posted < self.end()
    }

    pub fn is_empty(&self) -> bool {
        self.after >= self.before
    }
}

/// Start of `date` in UTC
pub fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

impl Default for DateWindow {
    fn default() -> Self {
        Self::policy()
    }
}

/// Whole days between two instants, rounded to the nearest day with ties
/// going to the even day.
pub fn days_between(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let millis = (end - start).num_milliseconds() as f64;
    (millis / 86_400_000.0).round_ties_even() as i64
}
