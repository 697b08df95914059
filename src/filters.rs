//! Category filtering of normalized transaction sets.

use std::borrow::Cow;

use crate::models::NormalizedTransaction;

/// Restrict `transactions` to one category (exact, case-sensitive match).
///
/// Without a category the input is passed through untouched and borrowed, so
/// callers can tell an identity pass-through from a filtered copy.
pub fn filter_by_category<'a>(
    transactions: &'a [NormalizedTransaction],
    category: Option<&str>,
) -> Cow<'a, [NormalizedTransaction]> {
    match category {
        None => Cow::Borrowed(transactions),
        Some(name) => Cow::Owned(
            transactions
                .iter()
                .filter(|tx| tx.category_matches(name))
                .cloned()
                .collect(),
        ),
    }
}
