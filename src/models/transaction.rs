use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const UNCATEGORIZED: &str = "Uncategorized";

/// An untrusted record as delivered by the input feed.
///
/// No shape is assumed: the normalizer probes it for the fields it knows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawTransaction(pub Value);

impl RawTransaction {
    pub fn new(value: Value) -> Self {
        Self(value)
    }
}

impl From<Value> for RawTransaction {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// A transaction with a guaranteed date, a finite amount and a non-empty
/// category. Fields the normalizer did not consume travel along in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedTransaction {
    pub date: NaiveDateTime,
    pub amount: f64,
    pub category: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NormalizedTransaction {
    /// Calendar day of the transaction, ignoring time-of-day.
    pub fn day(&self) -> NaiveDate {
        self.date.date()
    }

    pub fn category_matches(&self, name: &str) -> bool {
        self.category == name
    }
}

/// Sum of `amount` over `transactions`, added in slice order.
///
/// Every grand total goes through here so that totals over the same set agree
/// to the last bit.
pub fn sum_amounts(transactions: &[NormalizedTransaction]) -> f64 {
    transactions.iter().map(|tx| tx.amount).sum()
}
