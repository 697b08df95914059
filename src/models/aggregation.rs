use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::date_utils::range_label;

/// One statement week: the half-open interval `[start, end)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekBucket {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub total: f64,
    pub count: usize,
}

impl WeekBucket {
    /// `None` when the bucket would end past the last representable date.
    pub fn empty(start: NaiveDate, length_days: u32) -> Option<Self> {
        let end = start.checked_add_signed(Duration::try_days(length_days as i64)?)?;
        Some(Self {
            start,
            end,
            total: 0.0,
            count: 0,
        })
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day < self.end
    }

    /// Display label using the inclusive last day, e.g. "Jan 5 – 11, 2024".
    pub fn label(&self) -> String {
        range_label(self.start, self.end.pred_opt().unwrap_or(self.start))
    }
}

/// Weekly time series over a (possibly category-filtered) transaction set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregationResult {
    pub weeks: Vec<WeekBucket>,
    pub total: f64,
    /// First day of the first bucket.
    pub start: Option<NaiveDate>,
    /// Day of the latest transaction, not snapped to a bucket edge.
    pub end: Option<NaiveDate>,
    pub weekly_average: f64,
}

impl AggregationResult {
    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CategoryAmounts {
    pub actual: f64,
    pub projected: f64,
}

pub type CategoryTotals = BTreeMap<String, CategoryAmounts>;

/// Display row for one category of the spending breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRow {
    pub category: String,
    pub actual: f64,
    pub projected: f64,
    pub actual_percent: f64,
    pub combined_percent: f64,
    pub percent_label: i64,
    /// No actual spending yet, only forecast amounts.
    pub projected_only: bool,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategorySummary {
    pub totals: CategoryTotals,
    /// Sum of actual amounts only; projected amounts never count here.
    pub total_sum: f64,
    pub rows: Vec<CategoryRow>,
}

impl CategorySummary {
    pub fn row(&self, category: &str) -> Option<&CategoryRow> {
        self.rows.iter().find(|r| r.category == category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_bounds_are_half_open() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let bucket = WeekBucket::empty(start, 7).unwrap();
        assert_eq!(bucket.end, NaiveDate::from_ymd_opt(2024, 1, 12).unwrap());
        assert!(bucket.contains(start));
        assert!(bucket.contains(NaiveDate::from_ymd_opt(2024, 1, 11).unwrap()));
        assert!(!bucket.contains(bucket.end));
        assert_eq!(bucket.label(), "Jan 5 – 11, 2024");
    }

    #[test]
    fn test_bucket_past_last_date_is_rejected() {
        assert!(WeekBucket::empty(NaiveDate::MAX, 1).is_none());
        assert!(WeekBucket::empty(NaiveDate::MAX, 0).is_some());
    }

    #[test]
    fn test_default_result_is_empty() {
        let result = AggregationResult::default();
        assert!(result.is_empty());
        assert_eq!(result.total, 0.0);
        assert_eq!(result.start, None);
        assert_eq!(result.end, None);
        assert_eq!(result.weekly_average, 0.0);
    }
}
