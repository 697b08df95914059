use std::collections::BTreeMap;

use tracing::debug;

use crate::date_utils::locale_cmp;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    sum_amounts, CategoryAmounts, CategoryRow, CategorySummary, CategoryTotals,
    NormalizedTransaction,
};

/// Group actual and projected spending by category.
///
/// Percentages are shares of the actual grand total; projected amounts only
/// ever add to the numerator of `combined_percent`.
pub fn aggregate_by_category(
    actual: &[NormalizedTransaction],
    projected: &[NormalizedTransaction],
) -> EngineResult<CategorySummary> {
    let mut totals: CategoryTotals = BTreeMap::new();
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();

    for tx in actual {
        let entry = totals.entry(tx.category.clone()).or_default();
        entry.actual += tx.amount;
        *counts.entry(tx.category.clone()).or_insert(0) += 1;
    }

    for tx in projected {
        let entry = totals.entry(tx.category.clone()).or_default();
        entry.projected += tx.amount;
    }

    let total_sum = sum_amounts(actual);
    if !total_sum.is_finite() {
        return Err(EngineError::Internal(format!(
            "category total is not finite ({})",
            total_sum
        )));
    }

    let mut rows: Vec<CategoryRow> = totals
        .iter()
        .map(|(category, amounts)| {
            category_row(
                category,
                amounts,
                total_sum,
                counts.get(category).copied().unwrap_or(0),
            )
        })
        .collect();

    rows.sort_by(|a, b| locale_cmp(&a.category, &b.category));

    debug!(
        categories = rows.len(),
        total_sum,
        projected_records = projected.len(),
        "Aggregated spending by category"
    );

    Ok(CategorySummary {
        totals,
        total_sum,
        rows,
    })
}

fn category_row(
    category: &str,
    amounts: &CategoryAmounts,
    total_sum: f64,
    transaction_count: usize,
) -> CategoryRow {
    let actual_percent = if total_sum > 0.0 {
        amounts.actual / total_sum * 100.0
    } else {
        0.0
    };
    let combined_percent = if total_sum > 0.0 {
        (amounts.actual + amounts.projected) / total_sum * 100.0
    } else {
        actual_percent
    };

    CategoryRow {
        category: category.to_string(),
        actual: amounts.actual,
        projected: amounts.projected,
        actual_percent,
        combined_percent,
        percent_label: round_half_up(combined_percent),
        projected_only: amounts.actual == 0.0 && amounts.projected > 0.0,
        transaction_count,
    }
}

fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}
