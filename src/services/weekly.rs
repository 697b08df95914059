use chrono::{Duration, NaiveDate};
use tracing::trace;

use crate::config::EngineConfig;
use crate::date_utils::statement_week_start;
use crate::error::{EngineError, EngineResult};
use crate::models::{sum_amounts, AggregationResult, NormalizedTransaction, WeekBucket};

/// Upper bound on the number of buckets a single span may produce.
pub const MAX_BUCKETS: i64 = 100_000;

/// Partition transactions into contiguous statement weeks and sum each one.
///
/// The first bucket starts on the closing weekday on or before the earliest
/// transaction. Buckets keep coming while their start is not after the latest
/// transaction, so the final bucket is full length and may reach past it.
pub fn bucketize(
    transactions: &[NormalizedTransaction],
    config: &EngineConfig,
) -> EngineResult<AggregationResult> {
    if config.week_length_days == 0 {
        return Err(EngineError::Validation(
            "week length must be at least one day".into(),
        ));
    }

    let (Some(first), Some(last)) = (
        transactions.iter().map(|tx| tx.day()).min(),
        transactions.iter().map(|tx| tx.day()).max(),
    ) else {
        return Ok(AggregationResult::default());
    };

    let length = config.week_length_days as i64;
    let period_start = statement_week_start(first, config.statement_close_day)
        .ok_or_else(|| out_of_range(first))?;
    let span_days = (last - period_start).num_days();
    let bucket_count = span_days / length + 1;

    if bucket_count > MAX_BUCKETS {
        return Err(EngineError::Internal(format!(
            "span from {} to {} needs {} buckets (limit {})",
            period_start, last, bucket_count, MAX_BUCKETS
        )));
    }

    let mut weeks = (0..bucket_count)
        .map(|i| {
            Duration::try_days(i * length)
                .and_then(|offset| period_start.checked_add_signed(offset))
                .and_then(|start| WeekBucket::empty(start, config.week_length_days))
        })
        .collect::<Option<Vec<WeekBucket>>>()
        .ok_or_else(|| out_of_range(last))?;

    for tx in transactions {
        let offset = (tx.day() - period_start).num_days();
        let bucket = usize::try_from(offset / length)
            .ok()
            .and_then(|idx| weeks.get_mut(idx))
            .ok_or_else(|| {
                EngineError::Internal(format!(
                    "transaction on {} falls outside the span",
                    tx.day()
                ))
            })?;
        bucket.total += tx.amount;
        bucket.count += 1;
    }

    let total = sum_amounts(transactions);
    if !total.is_finite() {
        return Err(EngineError::Internal(format!(
            "weekly total is not finite ({})",
            total
        )));
    }
    let weekly_average = weekly_average(&weeks, total);

    trace!(
        buckets = weeks.len(),
        %period_start,
        %last,
        total,
        "Bucketized transactions"
    );

    Ok(AggregationResult {
        weeks,
        total,
        start: Some(period_start),
        end: Some(last),
        weekly_average,
    })
}

fn out_of_range(day: NaiveDate) -> EngineError {
    EngineError::Internal(format!(
        "statement weeks around {} leave the supported date range",
        day
    ))
}

/// Average spend per bucket.
///
/// A trailing bucket with a zero total is usually a week that has barely
/// started, so it is left out of the denominator. Only that single last bucket
/// is ever dropped.
pub fn weekly_average(weeks: &[WeekBucket], total: f64) -> f64 {
    let mut used = weeks.len();
    if weeks.last().is_some_and(|w| w.total == 0.0) {
        used -= 1;
    }
    if used == 0 {
        return 0.0;
    }
    total / used.max(1) as f64
}
